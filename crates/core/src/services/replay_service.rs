use std::collections::BTreeMap;

use crate::models::event::{is_placeholder, placeholder_name, EventKind, TradeEvent};
use crate::models::holding::Holding;

/// Replays the full event log from scratch to rebuild portfolio state.
///
/// Pure business logic — no I/O, no stored state. Any historical edit
/// (fixing a typo'd price, deleting a bad entry, inserting a backdated
/// trade) must cascade through every later average-cost and P&L figure;
/// replay-from-scratch guarantees that at O(n) cost per edit, which is
/// fine at personal-ledger scale.
pub struct ReplayService;

impl ReplayService {
    pub fn new() -> Self {
        Self
    }

    /// Rebuild holdings and annotate every event's computed fields.
    ///
    /// Total over any finite event list: sells with no holding (or nothing
    /// held) never error — they pass through with `realized_pl` untouched
    /// at 0. These, along with oversells that do get applied, can be
    /// surfaced via [`Self::find_orphan_sells`].
    ///
    /// Returns the holdings map and the chronologically sorted annotated
    /// event list. The sorted list is what gets persisted and what the fee
    /// calculator consumes.
    pub fn recompute(
        &self,
        mut events: Vec<TradeEvent>,
    ) -> (BTreeMap<String, Holding>, Vec<TradeEvent>) {
        // Stable sort: same-date events keep their relative input order.
        events.sort_by_key(|e| e.date);

        let mut holdings: BTreeMap<String, Holding> = BTreeMap::new();

        for event in events.iter_mut() {
            match event.kind {
                // Bookkeeping entries: realized_pl already carries the
                // signed amount; holdings are untouched.
                EventKind::Adjust | EventKind::SettleFee => {}
                EventKind::Buy => Self::apply_buy(&mut holdings, event),
                EventKind::Sell => Self::apply_sell(&mut holdings, event),
            }
        }

        (holdings, events)
    }

    /// Indices (into the replay-ordered list) of sells backed by fewer
    /// recorded shares than they sell — including none at all. These are
    /// data-entry inconsistencies worth surfacing, not failures: replay
    /// still applies an oversell in full (flooring the quantity at zero),
    /// so the realized P&L includes shares the log never bought.
    pub fn find_orphan_sells(&self, events: &[TradeEvent]) -> Vec<usize> {
        let mut quantities: BTreeMap<String, u32> = BTreeMap::new();
        let mut orphans = Vec::new();

        let mut order: Vec<usize> = (0..events.len()).collect();
        order.sort_by_key(|&i| events[i].date);

        for idx in order {
            let event = &events[idx];
            let code = event.code.trim().to_string();
            match event.kind {
                EventKind::Buy => {
                    *quantities.entry(code).or_insert(0) += event.quantity;
                }
                EventKind::Sell => match quantities.get_mut(&code) {
                    Some(q) if *q >= event.quantity => *q -= event.quantity,
                    // Held some but not enough: replay applies the sell
                    // anyway, so mirror its floor and flag the row.
                    Some(q) if *q > 0 => {
                        *q = 0;
                        orphans.push(idx);
                    }
                    _ => orphans.push(idx),
                },
                EventKind::Adjust | EventKind::SettleFee => {}
            }
        }

        orphans
    }

    fn apply_buy(holdings: &mut BTreeMap<String, Holding>, event: &mut TradeEvent) {
        let code = event.code.trim().to_string();
        let qty = event.quantity;
        let price = event.unit_price;

        // Name priority: event's carried name if real, else the holding's
        // current name if real, else whatever the event carried, else a
        // generated placeholder.
        let current_name = holdings.get(&code).map(|h| h.name.clone());
        let final_name = if !is_placeholder(&event.name) {
            event.name.clone()
        } else if let Some(name) = current_name.filter(|n| !is_placeholder(n)) {
            name
        } else if !event.name.is_empty() {
            event.name.clone()
        } else {
            placeholder_name(&code)
        };

        let holding = holdings
            .entry(code)
            .or_insert_with(|| Holding::new(final_name.clone()));

        let old_qty = f64::from(holding.quantity);
        let total_cost = old_qty * holding.avg_price + f64::from(qty) * price;

        // The "original" average ignores bonus resets so return-% can be
        // shown against true cash cost. Its base falls back to the trade
        // price on an empty position, or to the current average when only
        // the original is missing (positions predating the field).
        let mut base_avg = holding.original_avg_price;
        if base_avg == 0.0 && holding.quantity == 0 {
            base_avg = price;
        } else if base_avg == 0.0 && holding.avg_price > 0.0 {
            base_avg = holding.avg_price;
        }
        let total_real_cost = old_qty * base_avg + f64::from(qty) * price;

        let total_qty = holding.quantity + qty;
        let new_avg = if total_qty > 0 {
            round2(total_cost / f64::from(total_qty))
        } else {
            0.0
        };
        let new_real_avg = if total_qty > 0 {
            round2(total_real_cost / f64::from(total_qty))
        } else {
            0.0
        };

        holding.quantity = total_qty;
        holding.avg_price = new_avg;
        holding.original_avg_price = new_real_avg;
        holding.name = final_name.clone();

        event.avg_price = new_avg;
        event.realized_pl = 0.0;
        event.name = final_name;
    }

    fn apply_sell(holdings: &mut BTreeMap<String, Holding>, event: &mut TradeEvent) {
        let code = event.code.trim();
        let holding = match holdings.get_mut(code) {
            // Selling with nothing held mutates nothing; the event still
            // passes through so the log stays complete.
            Some(h) if h.quantity > 0 => h,
            _ => return,
        };

        let qty = event.quantity;
        let price = event.unit_price;

        if event.is_bonus {
            // Recover-full-principal sale: proceeds minus the ENTIRE
            // remaining position's cost, then the rest of the shares are
            // carried at zero cost.
            let profit = price * f64::from(qty) - holding.cost();
            holding.quantity = holding.quantity.saturating_sub(qty);
            holding.avg_price = 0.0;
            holding.realized_pl += profit;
            event.avg_price = 0.0;
            event.realized_pl = profit;
        } else {
            // Weighted-average convention: selling never changes the
            // remaining shares' cost basis.
            let profit = (price - holding.avg_price) * f64::from(qty);
            holding.quantity = holding.quantity.saturating_sub(qty);
            holding.realized_pl += profit;
            event.avg_price = holding.avg_price;
            event.realized_pl = profit;
        }

        event.name = holding.name.clone();
    }
}

impl Default for ReplayService {
    fn default() -> Self {
        Self::new()
    }
}

/// Round to 2 decimals, the persisted precision for average prices.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
