use async_trait::async_trait;

use crate::errors::LedgerError;

/// Durable storage for the ledger's two resources: the event log
/// (`trade_log.csv`, the source of truth) and the holdings snapshot
/// (`portfolio.csv`, a regenerable cache).
///
/// `save` replaces the whole resource. Implementations should reuse an
/// optimistic-concurrency token captured at the last load/save where the
/// backend offers one, falling back to unconditional overwrite-or-create.
/// Both methods take `&mut self` so implementations can cache such tokens.
#[async_trait]
pub trait LedgerStore: Send {
    /// Read a resource. `Ok(None)` means it does not exist yet.
    async fn load(&mut self, resource: &str) -> Result<Option<String>, LedgerError>;

    /// Replace a resource with new content, creating it if missing.
    async fn save(&mut self, resource: &str, content: &str) -> Result<(), LedgerError>;
}
