use crate::models::holding::Holding;

/// Shares trade in board lots of 100 on the target exchange.
pub const LOT_SIZE: u32 = 100;

/// Default uplift percentages shown by the bonus-conversion simulator.
pub const DEFAULT_UPLIFT_STEPS: &[u32] = &[0, 5, 10, 15, 20, 30, 40, 50, 75, 100, 150, 200];

/// One simulator row: at `target_price` (avg cost uplifted by
/// `uplift_pct`%), selling `shares_to_sell` recovers the position's
/// remaining cost, converting whatever is left to zero-cost shares.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusPlanRow {
    pub uplift_pct: u32,
    pub target_price: f64,
    /// Rounded up to a whole board lot
    pub shares_to_sell: u32,
    /// Shares kept after the sale; `None` when the position is too small
    pub remaining_shares: Option<u32>,
}

impl BonusPlanRow {
    pub fn is_feasible(&self) -> bool {
        self.remaining_shares.is_some()
    }
}

/// "How many shares would I have to sell to make the rest free?"
///
/// Answers the bonus-conversion question for a holding at a range of
/// assumed price uplifts. Pure arithmetic over the holding snapshot.
pub struct SimulationService;

impl SimulationService {
    pub fn new() -> Self {
        Self
    }

    /// Plan rows for each uplift step. Empty when the position's cost is
    /// already fully recovered (nothing left to convert).
    pub fn bonus_conversion_plan(&self, holding: &Holding, uplifts: &[u32]) -> Vec<BonusPlanRow> {
        let remaining_cost = holding.remaining_cost_to_recover();
        if remaining_cost <= 0.0 || holding.avg_price <= 0.0 {
            return Vec::new();
        }

        uplifts
            .iter()
            .map(|&pct| {
                let target_price = holding.avg_price * (1.0 + f64::from(pct) / 100.0);
                let raw_needed = (remaining_cost / target_price).ceil() as u32;
                // Round up to a full board lot
                let shares_to_sell = raw_needed.div_ceil(LOT_SIZE) * LOT_SIZE;
                BonusPlanRow {
                    uplift_pct: pct,
                    target_price,
                    shares_to_sell,
                    remaining_shares: holding.quantity.checked_sub(shares_to_sell),
                }
            })
            .collect()
    }
}

impl Default for SimulationService {
    fn default() -> Self {
        Self::new()
    }
}
