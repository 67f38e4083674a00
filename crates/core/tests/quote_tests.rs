// ═══════════════════════════════════════════════════════════════════
// Quote Service Tests — best-effort lookup, graceful degradation,
// sentinel handling, caching
// ═══════════════════════════════════════════════════════════════════

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use fee_ledger_core::errors::LedgerError;
use fee_ledger_core::models::event::{
    ADJUST_CODE, ADJUST_NAME, SETTLEMENT_CODE, SETTLEMENT_NAME,
};
use fee_ledger_core::models::quote::StockQuote;
use fee_ledger_core::providers::traits::QuoteProvider;
use fee_ledger_core::services::quote_service::QuoteService;

/// Provider that serves a fixed quote and counts how often it is asked.
struct FixedProvider {
    quote: StockQuote,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn new(name: &str, last: f64, prev: f64) -> Self {
        Self {
            quote: StockQuote::new(name, last, prev),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QuoteProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn lookup(&self, _code: &str) -> Result<StockQuote, LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.quote.clone())
    }
}

/// Provider that always fails.
struct BrokenProvider;

#[async_trait]
impl QuoteProvider for BrokenProvider {
    fn name(&self) -> &str {
        "broken"
    }

    async fn lookup(&self, code: &str) -> Result<StockQuote, LedgerError> {
        Err(LedgerError::Quote {
            provider: "broken".to_string(),
            code: code.to_string(),
            message: "connection refused".to_string(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn successful_lookup_returns_the_provider_quote() {
    let provider = FixedProvider::new("Toyota Motor", 2500.0, 2450.0);
    let mut svc = QuoteService::new();

    let quote = svc.fetch(&provider, "7203").await;
    assert_eq!(quote.name, "Toyota Motor");
    assert_eq!(quote.last_price, 2500.0);
    assert!(quote.has_price());
    assert_eq!(quote.change(), Some(50.0));
}

#[tokio::test]
async fn provider_failure_degrades_to_a_placeholder() {
    let mut svc = QuoteService::new();

    let quote = svc.fetch(&BrokenProvider, "7203").await;
    assert_eq!(quote.name, "Unknown(7203)");
    assert_eq!(quote.last_price, 0.0);
    assert!(!quote.has_price());
    assert_eq!(quote.change(), None);
    assert_eq!(quote.pct_change(), None);
}

#[tokio::test]
async fn sentinel_codes_never_reach_the_provider() {
    let provider = FixedProvider::new("should not be used", 1.0, 1.0);
    let mut svc = QuoteService::new();

    // Each sentinel keeps its own ledger label, matching the event rows
    for (code, label) in [(ADJUST_CODE, ADJUST_NAME), (SETTLEMENT_CODE, SETTLEMENT_NAME)] {
        let quote = svc.fetch(&provider, code).await;
        assert_eq!(quote.name, label);
        assert!(!quote.has_price());
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn repeated_lookups_are_served_from_cache() {
    let provider = FixedProvider::new("Toyota Motor", 2500.0, 2450.0);
    let mut svc = QuoteService::new();

    svc.fetch(&provider, "7203").await;
    svc.fetch(&provider, "7203").await;
    svc.fetch(&provider, " 7203 ").await;
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    // Different code is a separate cache entry
    svc.fetch(&provider, "9984").await;
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn clearing_the_cache_forces_a_refetch() {
    let provider = FixedProvider::new("Toyota Motor", 2500.0, 2450.0);
    let mut svc = QuoteService::new();

    svc.fetch(&provider, "7203").await;
    svc.clear();
    svc.fetch(&provider, "7203").await;
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_lookups_are_cached_too() {
    // A flapping provider should not be hammered on every repaint
    let mut svc = QuoteService::new();
    let quote1 = svc.fetch(&BrokenProvider, "7203").await;
    let quote2 = svc.fetch(&BrokenProvider, "7203").await;
    assert_eq!(quote1, quote2);
    assert!(!quote2.has_price());
}

#[test]
fn pct_change_is_relative_to_the_previous_close() {
    let quote = StockQuote::new("Toyota Motor", 2525.0, 2500.0);
    let pct = quote.pct_change().unwrap();
    assert!((pct - 1.0).abs() < 1e-9);
}
