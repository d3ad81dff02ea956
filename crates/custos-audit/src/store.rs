//! The storage seam between the audit core and its persistence
//! collaborator.
//!
//! The core never owns a schema or a database connection; it appends and
//! reads entries through this trait. Implementations must guarantee that
//! readers never observe a half-written entry — appended entries become
//! visible atomically, with all fields and the final hash set.

use custos_contracts::{AuditLogEntry, CustosResult};

/// Append-only persistence for audit entries.
///
/// The trait has no update or delete methods on purpose: entries are
/// immutable post-write, and retention is an explicit external policy.
pub trait AuditStore: Send + Sync {
    /// Persist one fully formed entry.
    ///
    /// Implementations should reject entries whose sequence does not
    /// directly follow the current head — a regression or gap here means
    /// two writers raced, which the append path must have prevented.
    fn append(&self, entry: AuditLogEntry) -> CustosResult<()>;

    /// The entry at `sequence`, if present.
    fn get(&self, sequence: u64) -> CustosResult<Option<AuditLogEntry>>;

    /// All entries with `sequence >= from`, ascending.
    fn load_from(&self, from: u64) -> CustosResult<Vec<AuditLogEntry>>;

    /// The entry with the highest sequence, if any.
    fn head(&self) -> CustosResult<Option<AuditLogEntry>>;

    /// Number of stored entries.
    fn len(&self) -> CustosResult<u64>;

    fn is_empty(&self) -> CustosResult<bool> {
        Ok(self.len()? == 0)
    }
}
