use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel instrument code for carried-forward P&L adjustments.
pub const ADJUST_CODE: &str = "ADJUST";

/// Sentinel instrument code for success-fee settlement entries.
pub const SETTLEMENT_CODE: &str = "PAYMENT";

/// Display name for `ADJUST` rows.
pub const ADJUST_NAME: &str = "Carried-forward P&L adjustment";

/// Display name for `PAYMENT` rows.
pub const SETTLEMENT_NAME: &str = "Success-fee settlement";

/// Kind of ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Buying shares of an instrument
    Buy,
    /// Selling shares (plain weighted-average, or bonus-share mode)
    Sell,
    /// Lump-sum correction to cumulative realized P&L (no instrument)
    Adjust,
    /// Success-fee settlement: zeroes out a profit pool (no instrument)
    SettleFee,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Buy => write!(f, "Buy"),
            EventKind::Sell => write!(f, "Sell"),
            EventKind::Adjust => write!(f, "Adjust"),
            EventKind::SettleFee => write!(f, "SettleFee"),
        }
    }
}

/// A single row of the trade log.
///
/// Events are ordered by business `date`, not insertion order. The
/// `avg_price` and `realized_pl` fields are **outputs** of replay: they are
/// rewritten on every recompute and only kept on the record for audit
/// display and persistence. For `Adjust`/`SettleFee` rows `unit_price` is
/// overloaded as the signed adjustment/settlement amount and `realized_pl`
/// carries the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Calendar date of the trade/adjustment
    pub date: NaiveDate,

    /// Buy / Sell / Adjust / SettleFee
    pub kind: EventKind,

    /// Ticker code, or a sentinel (`ADJUST`, `PAYMENT`) for pseudo-events
    pub code: String,

    /// Display name. Resolved lazily; a real name is never overwritten
    /// by a placeholder once known.
    pub name: String,

    /// Shares traded (0 for Adjust/SettleFee)
    pub quantity: u32,

    /// Trade price per share; signed amount for Adjust/SettleFee
    pub unit_price: f64,

    /// Computed: average cost after this event applies (0 for bonus sells)
    #[serde(default)]
    pub avg_price: f64,

    /// Computed: P&L realized by this event (0 for buys)
    #[serde(default)]
    pub realized_pl: f64,

    /// Bonus-share accounting flag (sell) or bonus-fee settlement (settle).
    /// Defaults to false so files predating the flag still load.
    #[serde(default, rename = "bonus")]
    pub is_bonus: bool,
}

impl TradeEvent {
    /// A buy order. `name` may be a placeholder; replay resolves it.
    pub fn buy(
        date: NaiveDate,
        code: impl Into<String>,
        name: impl Into<String>,
        quantity: u32,
        unit_price: f64,
    ) -> Self {
        Self {
            date,
            kind: EventKind::Buy,
            code: code.into(),
            name: name.into(),
            quantity,
            unit_price,
            avg_price: 0.0,
            realized_pl: 0.0,
            is_bonus: false,
        }
    }

    /// A sell order; `is_bonus` switches to bonus-share accounting.
    pub fn sell(
        date: NaiveDate,
        code: impl Into<String>,
        quantity: u32,
        unit_price: f64,
        is_bonus: bool,
    ) -> Self {
        Self {
            date,
            kind: EventKind::Sell,
            code: code.into(),
            name: String::new(),
            quantity,
            unit_price,
            avg_price: 0.0,
            realized_pl: 0.0,
            is_bonus,
        }
    }

    /// A carried-forward P&L adjustment under the `ADJUST` sentinel.
    pub fn adjustment(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            kind: EventKind::Adjust,
            code: ADJUST_CODE.to_string(),
            name: ADJUST_NAME.to_string(),
            quantity: 0,
            unit_price: amount,
            avg_price: 0.0,
            realized_pl: amount,
            is_bonus: false,
        }
    }

    /// A success-fee settlement under the `PAYMENT` sentinel. `amount` is
    /// the negative of the profit being cleared.
    pub fn settlement(date: NaiveDate, amount: f64, is_bonus: bool) -> Self {
        Self {
            date,
            kind: EventKind::SettleFee,
            code: SETTLEMENT_CODE.to_string(),
            name: SETTLEMENT_NAME.to_string(),
            quantity: 0,
            unit_price: amount,
            avg_price: 0.0,
            realized_pl: amount,
            is_bonus,
        }
    }

    /// True for the bookkeeping kinds that never touch holdings.
    pub fn is_pseudo(&self) -> bool {
        matches!(self.kind, EventKind::Adjust | EventKind::SettleFee)
    }
}

/// Generated display name for a code whose real name is unknown.
pub fn placeholder_name(code: &str) -> String {
    format!("Unknown({code})")
}

/// Whether a display name is absent or a generated placeholder.
/// Placeholders never overwrite a known-good name during replay.
pub fn is_placeholder(name: &str) -> bool {
    name.is_empty() || (name.starts_with("Unknown(") && name.ends_with(')'))
}
