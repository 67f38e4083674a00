use serde::{Deserialize, Serialize};

/// Derived position for one instrument. Rebuilt entirely on every replay —
/// never hand-patched — so it is always consistent with the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Display name (resolved from quotes or carried on buy events)
    pub name: String,

    /// Shares currently held (never negative)
    pub quantity: u32,

    /// Weighted-average cost per share. 0 once bonus-converted.
    pub avg_price: f64,

    /// Average cost ignoring any bonus-share reset. Used only for
    /// return-% display against true cash cost.
    #[serde(default)]
    pub original_avg_price: f64,

    /// Cumulative realized P&L across all sells of this instrument
    pub realized_pl: f64,
}

impl Holding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: 0,
            avg_price: 0.0,
            original_avg_price: 0.0,
            realized_pl: 0.0,
        }
    }

    /// Total cost of the remaining position at the current average.
    pub fn cost(&self) -> f64 {
        self.avg_price * f64::from(self.quantity)
    }

    /// Whether the position's cost basis has been reset to zero by a
    /// bonus-mode sell while shares remain.
    pub fn is_bonus_converted(&self) -> bool {
        self.quantity > 0 && self.avg_price == 0.0
    }

    /// Cost not yet recovered by realized gains. Zero or negative means
    /// the position could be fully bonus-converted today.
    pub fn remaining_cost_to_recover(&self) -> f64 {
        self.cost() - self.realized_pl
    }
}
