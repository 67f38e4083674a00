use chrono::NaiveDate;

use crate::errors::LedgerError;
use crate::models::event::TradeEvent;
use crate::models::ledger::Ledger;

use super::replay_service::ReplayService;

/// Turns validated user intents into ledger events and runs the replay.
///
/// Validation fails with `InvalidInput` before any event is created — a
/// rejected intent never partially applies.
pub struct TransactionService {
    replay: ReplayService,
}

impl TransactionService {
    pub fn new() -> Self {
        Self {
            replay: ReplayService::new(),
        }
    }

    /// Build a buy event. `name` is optional; when absent the replay
    /// assigns a placeholder until a real name is known.
    pub fn build_buy(
        &self,
        date: NaiveDate,
        code: &str,
        name: Option<String>,
        quantity: u32,
        unit_price: f64,
    ) -> Result<TradeEvent, LedgerError> {
        let code = Self::validate_trade(code, quantity, unit_price)?;
        Ok(TradeEvent::buy(
            date,
            code,
            name.unwrap_or_default(),
            quantity,
            unit_price,
        ))
    }

    /// Build a sell event, plain or bonus-mode.
    pub fn build_sell(
        &self,
        date: NaiveDate,
        code: &str,
        quantity: u32,
        unit_price: f64,
        is_bonus: bool,
    ) -> Result<TradeEvent, LedgerError> {
        let code = Self::validate_trade(code, quantity, unit_price)?;
        Ok(TradeEvent::sell(date, code, quantity, unit_price, is_bonus))
    }

    /// Build a carried-forward P&L adjustment. Any signed amount is valid;
    /// this is how historical, externally tracked P&L enters the ledger.
    pub fn build_adjustment(&self, date: NaiveDate, amount: f64) -> Result<TradeEvent, LedgerError> {
        if !amount.is_finite() {
            return Err(LedgerError::InvalidInput(
                "Adjustment amount must be a finite number".into(),
            ));
        }
        Ok(TradeEvent::adjustment(date, amount))
    }

    /// Build a fee settlement clearing `profit` from the plain or bonus
    /// pool. The stored amount is the negated profit, so summing the pool
    /// afterwards nets back toward zero.
    pub fn build_settlement(
        &self,
        date: NaiveDate,
        profit: f64,
        is_bonus: bool,
    ) -> Result<TradeEvent, LedgerError> {
        if !profit.is_finite() || profit <= 0.0 {
            return Err(LedgerError::InvalidInput(format!(
                "Cannot settle a fee on a non-positive profit ({profit})"
            )));
        }
        Ok(TradeEvent::settlement(date, -profit, is_bonus))
    }

    /// Append one event and replay the whole log.
    pub fn apply(&self, ledger: &mut Ledger, event: TradeEvent) {
        let mut events = std::mem::take(&mut ledger.events);
        events.push(event);
        let (holdings, annotated) = self.replay.recompute(events);
        ledger.holdings = holdings;
        ledger.events = annotated;
    }

    /// Bulk edit path: replace the entire event list (supporting insert,
    /// delete, and edit of any row) and replay from scratch.
    pub fn replace_all(&self, ledger: &mut Ledger, events: Vec<TradeEvent>) {
        let (holdings, annotated) = self.replay.recompute(events);
        ledger.holdings = holdings;
        ledger.events = annotated;
    }

    fn validate_trade(code: &str, quantity: u32, unit_price: f64) -> Result<String, LedgerError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(LedgerError::InvalidInput(
                "Instrument code must not be empty".into(),
            ));
        }
        if quantity == 0 {
            return Err(LedgerError::InvalidInput(
                "Quantity must be positive".into(),
            ));
        }
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(LedgerError::InvalidInput(format!(
                "Unit price must be zero or positive, got {unit_price}"
            )));
        }
        Ok(code.to_string())
    }
}

impl Default for TransactionService {
    fn default() -> Self {
        Self::new()
    }
}
