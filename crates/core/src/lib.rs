pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use errors::LedgerError;
use models::{
    event::TradeEvent,
    holding::Holding,
    ledger::Ledger,
    quote::StockQuote,
};
use providers::traits::QuoteProvider;
use services::{
    fee_service::{FeeReport, FeeService, SettlementRecord},
    quote_service::QuoteService,
    replay_service::ReplayService,
    simulation_service::{BonusPlanRow, SimulationService, DEFAULT_UPLIFT_STEPS},
    transaction_service::TransactionService,
};
use storage::{format, traits::LedgerStore, EVENT_LOG_RESOURCE, HOLDINGS_RESOURCE};

/// Main entry point for the fee-ledger core library.
///
/// Holds the event log, the holdings projection derived from it, and the
/// services that operate on them. Every mutation goes through the same
/// path: append or replace events, then replay the whole log from scratch,
/// so any retroactive edit cascades correctly through every later
/// average-cost and P&L figure.
///
/// Single-user, single-writer model: mutations are synchronous and the
/// persisted holdings snapshot is only a cache — on load, holdings are
/// always rederived from the event log.
#[must_use]
pub struct FeeLedger {
    ledger: Ledger,
    transactions: TransactionService,
    replay: ReplayService,
    fees: FeeService,
    simulator: SimulationService,
    quotes: QuoteService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for FeeLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeeLedger")
            .field("events", &self.ledger.events.len())
            .field("holdings", &self.ledger.holdings.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl FeeLedger {
    /// Create a brand new, empty ledger.
    pub fn create_new() -> Self {
        Self::build(Ledger::default())
    }

    /// Build a ledger from an existing event list, replaying it to derive
    /// holdings and (re)populate the computed fields on every event.
    pub fn from_events(events: Vec<TradeEvent>) -> Self {
        let mut ledger = Self::build(Ledger::default());
        ledger.transactions.replace_all(&mut ledger.ledger, events);
        ledger
    }

    /// Load the ledger from a store.
    ///
    /// Only the event log is read: the holdings snapshot is a cached
    /// projection, so it is rederived here rather than trusted. This makes
    /// a crash between the two writes of a previous save self-healing.
    pub async fn load_from_store(store: &mut dyn LedgerStore) -> Result<Self, LedgerError> {
        let raw = store.load(EVENT_LOG_RESOURCE).await?.unwrap_or_default();
        let events = format::read_events(&raw)?;
        Ok(Self::from_events(events))
    }

    /// Persist the event log and the holdings snapshot.
    ///
    /// Two separate writes with no cross-file transaction; the event log
    /// goes first because it is the source of truth. On failure the
    /// in-memory state is untouched and stays marked dirty, so the caller
    /// can warn and retry on the next save.
    pub async fn save_to_store(&mut self, store: &mut dyn LedgerStore) -> Result<(), LedgerError> {
        let events_csv = format::write_events(&self.ledger.events)?;
        let holdings_csv = format::write_holdings(&self.ledger.holdings)?;

        store.save(EVENT_LOG_RESOURCE, &events_csv).await?;
        store.save(HOLDINGS_RESOURCE, &holdings_csv).await?;

        self.dirty = false;
        Ok(())
    }

    // ── Recording trades ────────────────────────────────────────────

    /// Record a buy. `name` is optional; when omitted, replay keeps a
    /// placeholder until a real name arrives (e.g. via `lookup_quote`).
    pub fn record_buy(
        &mut self,
        date: NaiveDate,
        code: &str,
        name: Option<String>,
        quantity: u32,
        unit_price: f64,
    ) -> Result<(), LedgerError> {
        let event = self
            .transactions
            .build_buy(date, code, name, quantity, unit_price)?;
        self.transactions.apply(&mut self.ledger, event);
        self.dirty = true;
        Ok(())
    }

    /// Record a sell. With `is_bonus` set, the sale realizes proceeds
    /// minus the entire remaining position's cost and converts the rest of
    /// the shares to zero cost basis.
    pub fn record_sell(
        &mut self,
        date: NaiveDate,
        code: &str,
        quantity: u32,
        unit_price: f64,
        is_bonus: bool,
    ) -> Result<(), LedgerError> {
        let event = self
            .transactions
            .build_sell(date, code, quantity, unit_price, is_bonus)?;
        self.transactions.apply(&mut self.ledger, event);
        self.dirty = true;
        Ok(())
    }

    /// Record a lump-sum correction to cumulative realized P&L. Used to
    /// carry forward externally tracked historical results.
    pub fn record_adjustment(&mut self, date: NaiveDate, amount: f64) -> Result<(), LedgerError> {
        let event = self.transactions.build_adjustment(date, amount)?;
        self.transactions.apply(&mut self.ledger, event);
        self.dirty = true;
        Ok(())
    }

    // ── Fee settlement ──────────────────────────────────────────────

    /// Settle the plain success fee: records a settlement clearing the
    /// current plain profit pool, driving it back to zero so the same
    /// profit is never charged twice. Fails when the pool is not positive
    /// or the fee has not yet cleared the claim threshold — small fees
    /// accrue until they are worth paying out.
    pub fn settle_plain_fee(&mut self, date: NaiveDate) -> Result<SettlementRecord, LedgerError> {
        let report = self.fee_report();
        if !report.fee_claimable() {
            return Err(LedgerError::InvalidInput(format!(
                "Plain fee {} has not cleared the claim threshold of {}",
                report.fee, report.claim_threshold
            )));
        }
        self.settle(date, report.plain_profit, false)
    }

    /// Settle the bonus-pool success fee.
    pub fn settle_bonus_fee(&mut self, date: NaiveDate) -> Result<SettlementRecord, LedgerError> {
        let profit = self.fee_report().bonus_profit;
        self.settle(date, profit, true)
    }

    fn settle(
        &mut self,
        date: NaiveDate,
        profit: f64,
        is_bonus: bool,
    ) -> Result<SettlementRecord, LedgerError> {
        let event = self.transactions.build_settlement(date, profit, is_bonus)?;
        self.transactions.apply(&mut self.ledger, event);
        self.dirty = true;
        Ok(SettlementRecord {
            date,
            is_bonus,
            profit_cleared: profit,
            fee_paid: profit * services::fee_service::FEE_RATE,
        })
    }

    // ── Bulk editing ────────────────────────────────────────────────

    /// Replace the entire event list — the edit/delete/insert path — and
    /// replay from scratch so every downstream figure is recomputed.
    pub fn replace_events(&mut self, events: Vec<TradeEvent>) {
        self.transactions.replace_all(&mut self.ledger, events);
        self.dirty = true;
    }

    // ── Views ───────────────────────────────────────────────────────

    /// All events in replay (chronological) order, computed fields
    /// populated.
    #[must_use]
    pub fn events(&self) -> &[TradeEvent] {
        &self.ledger.events
    }

    /// Events for one instrument code, in chronological order.
    #[must_use]
    pub fn events_for(&self, code: &str) -> Vec<&TradeEvent> {
        let code = code.trim();
        self.ledger
            .events
            .iter()
            .filter(|e| e.code.trim() == code)
            .collect()
    }

    /// All holdings ever traded, including sold-out (quantity 0) entries.
    #[must_use]
    pub fn holdings(&self) -> &BTreeMap<String, Holding> {
        &self.ledger.holdings
    }

    /// Holdings with shares still on the books, key-ordered.
    #[must_use]
    pub fn active_holdings(&self) -> Vec<(&String, &Holding)> {
        self.ledger.active_holdings().collect()
    }

    /// One holding by instrument code.
    #[must_use]
    pub fn holding(&self, code: &str) -> Option<&Holding> {
        self.ledger.holdings.get(code.trim())
    }

    /// Current success-fee figures for both profit pools.
    #[must_use]
    pub fn fee_report(&self) -> FeeReport {
        self.fees.report(&self.ledger.events)
    }

    /// Past fee payouts, oldest first.
    #[must_use]
    pub fn settlement_history(&self) -> Vec<SettlementRecord> {
        self.fees.past_settlements(&self.ledger.events)
    }

    /// Sell events backed by fewer recorded shares than they sell —
    /// data-entry inconsistencies that deserve user review but never
    /// block replay.
    #[must_use]
    pub fn orphan_sells(&self) -> Vec<&TradeEvent> {
        self.replay
            .find_orphan_sells(&self.ledger.events)
            .into_iter()
            .map(|i| &self.ledger.events[i])
            .collect()
    }

    /// Bonus-conversion plan for a held instrument at the default uplift
    /// steps. `None` when the code is unknown; empty when the position's
    /// cost is already fully recovered.
    #[must_use]
    pub fn bonus_plan(&self, code: &str) -> Option<Vec<BonusPlanRow>> {
        self.holding(code)
            .map(|h| self.simulator.bonus_conversion_plan(h, DEFAULT_UPLIFT_STEPS))
    }

    /// Total number of events in the log.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.ledger.events.len()
    }

    /// Returns `true` if the ledger has been modified since the last save
    /// or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Quotes ──────────────────────────────────────────────────────

    /// Best-effort name/price lookup for display. Provider failures come
    /// back as a placeholder quote, never an error, and a zero price means
    /// "unavailable" — it must not be treated as a real market price.
    pub async fn lookup_quote(
        &mut self,
        provider: &dyn QuoteProvider,
        code: &str,
    ) -> StockQuote {
        self.quotes.fetch(provider, code).await
    }

    /// Drop cached quotes so the next lookup re-asks the provider.
    pub fn clear_quote_cache(&mut self) {
        self.quotes.clear();
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(ledger: Ledger) -> Self {
        Self {
            ledger,
            transactions: TransactionService::new(),
            replay: ReplayService::new(),
            fees: FeeService::new(),
            simulator: SimulationService::new(),
            quotes: QuoteService::new(),
            dirty: false,
        }
    }
}
