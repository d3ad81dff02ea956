//! In-memory implementation of `AuditStore`.
//!
//! `MemoryAuditStore` is the reference store: a `Vec` behind a `Mutex`,
//! safe to share across threads while the writer appends. It also backs
//! the operator CLI, which loads a JSONL log dump through `from_entries`
//! and verifies it offline.

use std::sync::Mutex;

use custos_contracts::{AuditLogEntry, CustosError, CustosResult};

use crate::store::AuditStore;

/// An in-memory, append-only audit store.
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: Mutex<Vec<AuditLogEntry>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store over previously persisted entries.
    ///
    /// Entries are sorted by sequence. No integrity checking happens here —
    /// loading a tampered log must succeed so the verifier can inspect it.
    pub fn from_entries(mut entries: Vec<AuditLogEntry>) -> Self {
        entries.sort_by_key(|e| e.sequence);
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// A snapshot of every stored entry, in sequence order.
    pub fn export(&self) -> CustosResult<Vec<AuditLogEntry>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> CustosResult<std::sync::MutexGuard<'_, Vec<AuditLogEntry>>> {
        self.entries.lock().map_err(|e| CustosError::StoreError {
            reason: format!("audit store lock poisoned: {}", e),
        })
    }
}

impl AuditStore for MemoryAuditStore {
    /// Append one entry, enforcing the gapless-sequence invariant relative
    /// to the current head.
    fn append(&self, entry: AuditLogEntry) -> CustosResult<()> {
        let mut entries = self.lock()?;

        if let Some(last) = entries.last() {
            let expected = last.sequence + 1;
            if entry.sequence != expected {
                return Err(CustosError::StoreError {
                    reason: format!(
                        "sequence {} does not follow head {} (expected {})",
                        entry.sequence, last.sequence, expected
                    ),
                });
            }
        }

        entries.push(entry);
        Ok(())
    }

    fn get(&self, sequence: u64) -> CustosResult<Option<AuditLogEntry>> {
        let entries = self.lock()?;
        // Entries are sequence-sorted, so binary search applies.
        Ok(entries
            .binary_search_by_key(&sequence, |e| e.sequence)
            .ok()
            .map(|idx| entries[idx].clone()))
    }

    fn load_from(&self, from: u64) -> CustosResult<Vec<AuditLogEntry>> {
        let entries = self.lock()?;
        let start = entries.partition_point(|e| e.sequence < from);
        Ok(entries[start..].to_vec())
    }

    fn head(&self) -> CustosResult<Option<AuditLogEntry>> {
        Ok(self.lock()?.last().cloned())
    }

    fn len(&self) -> CustosResult<u64> {
        Ok(self.lock()?.len() as u64)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
