pub mod format;
pub mod github;
pub mod traits;

/// Resource name of the persisted event log (the source of truth).
pub const EVENT_LOG_RESOURCE: &str = "trade_log.csv";

/// Resource name of the persisted holdings snapshot (a regenerable cache).
pub const HOLDINGS_RESOURCE: &str = "portfolio.csv";
