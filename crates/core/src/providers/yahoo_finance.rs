use async_trait::async_trait;

use crate::errors::LedgerError;
use crate::models::quote::StockQuote;

use super::traits::QuoteProvider;

/// Yahoo Finance quote provider.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities; bare numeric codes are resolved on the
///   configured exchange via a symbol suffix (`.T` for Tokyo by default,
///   since Japanese tickers are listed as e.g. `7203.T`).
///
/// Uses the `yahoo_finance_api` crate. The display name comes from ticker
/// search; last price and previous close from the most recent daily bars.
pub struct YahooQuoteProvider {
    connector: yahoo_finance_api::YahooConnector,
    /// Exchange suffix appended to bare codes (e.g. ".T")
    suffix: String,
}

impl YahooQuoteProvider {
    pub fn new(suffix: impl Into<String>) -> Result<Self, LedgerError> {
        let connector =
            yahoo_finance_api::YahooConnector::new().map_err(|e| LedgerError::Quote {
                provider: "Yahoo Finance".into(),
                code: String::new(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self {
            connector,
            suffix: suffix.into(),
        })
    }

    /// Provider for Tokyo Stock Exchange listings.
    pub fn tokyo() -> Result<Self, LedgerError> {
        Self::new(".T")
    }

    fn full_symbol(&self, code: &str) -> String {
        let code = code.trim();
        if code.contains('.') {
            code.to_string()
        } else {
            format!("{code}{}", self.suffix)
        }
    }

    fn quote_error(&self, code: &str, message: String) -> LedgerError {
        LedgerError::Quote {
            provider: self.name().to_string(),
            code: code.to_string(),
            message,
        }
    }

    async fn resolve_name(&self, code: &str, symbol: &str) -> Result<Option<String>, LedgerError> {
        let results = self
            .connector
            .search_ticker(symbol)
            .await
            .map_err(|e| self.quote_error(code, format!("Ticker search failed: {e}")))?;

        // Prefer the exact symbol match; otherwise take the first hit.
        let item = results
            .quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .or_else(|| results.quotes.first());

        Ok(item.map(|q| {
            if q.long_name.is_empty() {
                q.short_name.clone()
            } else {
                q.long_name.clone()
            }
        })
        .filter(|n| !n.is_empty()))
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn lookup(&self, code: &str) -> Result<StockQuote, LedgerError> {
        let symbol = self.full_symbol(code);

        // A few days of daily bars: the last close is the current price,
        // the one before it the previous close.
        let resp = self
            .connector
            .get_quote_range(&symbol, "1d", "5d")
            .await
            .map_err(|e| self.quote_error(code, format!("Failed to fetch quotes: {e}")))?;

        let quotes = resp
            .quotes()
            .map_err(|e| self.quote_error(code, format!("No quote data: {e}")))?;

        let last_price = quotes.last().map(|q| q.close).unwrap_or(0.0);
        let previous_close = if quotes.len() >= 2 {
            quotes[quotes.len() - 2].close
        } else {
            last_price
        };

        let name = self
            .resolve_name(code, &symbol)
            .await
            .unwrap_or(None)
            .unwrap_or_else(|| crate::models::event::placeholder_name(code));

        Ok(StockQuote::new(name, last_price, previous_close))
    }
}
