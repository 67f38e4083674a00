use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::event::{ADJUST_CODE, ADJUST_NAME, SETTLEMENT_CODE, SETTLEMENT_NAME};
use crate::models::quote::StockQuote;
use crate::providers::traits::QuoteProvider;

/// How long a fetched quote stays fresh before re-asking the provider.
const QUOTE_TTL: Duration = Duration::from_secs(300);

/// Best-effort quote resolution with a short-lived in-memory cache.
///
/// Never fails: provider errors and unknown tickers degrade to a
/// placeholder name with zero prices. A zero price means "unavailable" —
/// it is display data only and never enters P&L math.
pub struct QuoteService {
    cache: HashMap<String, (Instant, StockQuote)>,
}

impl QuoteService {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Resolve a code through the given provider, caching results for a
    /// few minutes. Sentinel codes get their fixed ledger labels and no
    /// prices.
    pub async fn fetch(&mut self, provider: &dyn QuoteProvider, code: &str) -> StockQuote {
        let code = code.trim();
        if code == ADJUST_CODE {
            return StockQuote::new(ADJUST_NAME, 0.0, 0.0);
        }
        if code == SETTLEMENT_CODE {
            return StockQuote::new(SETTLEMENT_NAME, 0.0, 0.0);
        }

        if let Some((fetched_at, quote)) = self.cache.get(code) {
            if fetched_at.elapsed() < QUOTE_TTL {
                return quote.clone();
            }
        }

        let quote = match provider.lookup(code).await {
            Ok(quote) => quote,
            Err(_) => StockQuote::unavailable(code),
        };

        self.cache.insert(code.to_string(), (Instant::now(), quote.clone()));
        quote
    }

    /// Drop all cached quotes (e.g. on an explicit refresh).
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for QuoteService {
    fn default() -> Self {
        Self::new()
    }
}
