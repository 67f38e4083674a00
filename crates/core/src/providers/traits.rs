use async_trait::async_trait;

use crate::errors::LedgerError;
use crate::models::quote::StockQuote;

/// Trait abstraction over market-data sources.
///
/// The ledger only ever needs a display name and, optionally, a last
/// price / previous close for a ticker code. Implementations may fail;
/// callers go through `QuoteService`, which degrades failures to
/// placeholder quotes instead of propagating them.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Resolve a ticker code to a display name and current prices.
    async fn lookup(&self, code: &str) -> Result<StockQuote, LedgerError>;
}
