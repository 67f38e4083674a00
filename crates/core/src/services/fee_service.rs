use chrono::NaiveDate;

use crate::models::event::{EventKind, TradeEvent};

/// Advisor's cut of net realized profit.
pub const FEE_RATE: f64 = 0.15;

/// Fees at or below this are computed exactly but reported as not yet
/// claimable (¥10,000 by default).
pub const DEFAULT_CLAIM_THRESHOLD: f64 = 10_000.0;

/// Success-fee figures derived from the annotated event list.
///
/// Two independent pools: plain realized P&L (sells, adjustments, and plain
/// settlements) and bonus-mode P&L. Settlements carry negative amounts, so
/// once a fee is paid out its pool nets back toward zero and the same
/// profit is never charged twice.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeReport {
    /// Net realized profit in the plain pool (can be negative)
    pub plain_profit: f64,
    /// Net realized profit in the bonus pool (can be negative)
    pub bonus_profit: f64,
    /// 15% of the plain pool when positive, else 0
    pub fee: f64,
    /// 15% of the bonus pool when positive, else 0
    pub bonus_fee: f64,
    /// Display threshold below which the plain fee is not yet claimable
    pub claim_threshold: f64,
}

impl FeeReport {
    /// Whether the plain fee has cleared the claim threshold.
    pub fn fee_claimable(&self) -> bool {
        self.fee > self.claim_threshold
    }

    /// The bonus fee has no minimum; it is claimable whenever positive.
    pub fn bonus_fee_claimable(&self) -> bool {
        self.bonus_fee > 0.0
    }
}

/// One past fee payout, reconstructed from a `SettleFee` row.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRecord {
    pub date: NaiveDate,
    pub is_bonus: bool,
    /// Profit that was cleared by this settlement (positive)
    pub profit_cleared: f64,
    /// Fee actually paid out (15% of the cleared profit)
    pub fee_paid: f64,
}

/// Pure fee computations over the annotated event list.
pub struct FeeService {
    claim_threshold: f64,
}

impl FeeService {
    pub fn new() -> Self {
        Self {
            claim_threshold: DEFAULT_CLAIM_THRESHOLD,
        }
    }

    pub fn with_threshold(claim_threshold: f64) -> Self {
        Self { claim_threshold }
    }

    /// Compute both profit pools and the fees owed on them.
    pub fn report(&self, events: &[TradeEvent]) -> FeeReport {
        let mut plain_profit = 0.0;
        let mut bonus_profit = 0.0;

        for event in events {
            if event.is_bonus {
                bonus_profit += event.realized_pl;
            } else {
                plain_profit += event.realized_pl;
            }
        }

        FeeReport {
            plain_profit,
            bonus_profit,
            fee: if plain_profit > 0.0 {
                plain_profit * FEE_RATE
            } else {
                0.0
            },
            bonus_fee: if bonus_profit > 0.0 {
                bonus_profit * FEE_RATE
            } else {
                0.0
            },
            claim_threshold: self.claim_threshold,
        }
    }

    /// Reconstruct the payout history from settlement rows, oldest first.
    pub fn past_settlements(&self, events: &[TradeEvent]) -> Vec<SettlementRecord> {
        events
            .iter()
            .filter(|e| e.kind == EventKind::SettleFee)
            .map(|e| {
                let profit_cleared = e.realized_pl.abs();
                SettlementRecord {
                    date: e.date,
                    is_bonus: e.is_bonus,
                    profit_cleared,
                    fee_paid: profit_cleared * FEE_RATE,
                }
            })
            .collect()
    }
}

impl Default for FeeService {
    fn default() -> Self {
        Self::new()
    }
}
