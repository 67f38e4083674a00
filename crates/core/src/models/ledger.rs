use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::TradeEvent;
use super::holding::Holding;

/// The main data container: the chronologically sorted event log and the
/// holdings projection derived from it.
///
/// The event log is the single source of truth. Holdings are a cached
/// projection: they are discarded and rederived on every mutation, and a
/// stale persisted snapshot is simply regenerated on the next load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// All events, kept in replay (date-sorted) order
    pub events: Vec<TradeEvent>,

    /// One entry per instrument ever traded, keyed by code.
    /// Quantity-0 entries are retained for audit.
    pub holdings: BTreeMap<String, Holding>,
}

impl Ledger {
    /// Holdings with shares still on the books. Sold-out positions stay in
    /// `holdings` for audit but are excluded from active-portfolio views.
    pub fn active_holdings(&self) -> impl Iterator<Item = (&String, &Holding)> {
        self.holdings.iter().filter(|(_, h)| h.quantity > 0)
    }
}
