use serde::{Deserialize, Serialize};

use super::event::placeholder_name;

/// Market snapshot for one instrument, as reported by a quote provider.
///
/// A `last_price` of 0 means "unavailable", not a real quote: callers must
/// not feed it into P&L math. Lookup failures degrade to
/// [`StockQuote::unavailable`] rather than erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    /// Resolved display name, or a `Unknown(<code>)` placeholder
    pub name: String,

    /// Last traded price (0 = unavailable)
    pub last_price: f64,

    /// Previous session's close (0 = unavailable)
    pub previous_close: f64,
}

impl StockQuote {
    pub fn new(name: impl Into<String>, last_price: f64, previous_close: f64) -> Self {
        Self {
            name: name.into(),
            last_price,
            previous_close,
        }
    }

    /// Placeholder quote for a code that could not be resolved.
    pub fn unavailable(code: &str) -> Self {
        Self {
            name: placeholder_name(code),
            last_price: 0.0,
            previous_close: 0.0,
        }
    }

    /// Whether the quote carries a usable price.
    pub fn has_price(&self) -> bool {
        self.last_price > 0.0
    }

    /// Absolute change since the previous close, if both sides are known.
    pub fn change(&self) -> Option<f64> {
        if self.last_price > 0.0 && self.previous_close > 0.0 {
            Some(self.last_price - self.previous_close)
        } else {
            None
        }
    }

    /// Percent change since the previous close, if both sides are known.
    pub fn pct_change(&self) -> Option<f64> {
        self.change()
            .map(|c| (c / self.previous_close) * 100.0)
    }
}
