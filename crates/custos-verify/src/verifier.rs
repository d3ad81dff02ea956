//! Chain replay and fault reporting.
//!
//! The verifier re-derives every entry's hash from its stored fields and
//! compares against what the chain recorded. A broken chain is an
//! operational finding, not a program error: the result is always a
//! `ChainReport`, and only store access problems surface as `Err`.

use tracing::{debug, warn};

use custos_audit::{hash_entry, AuditStore};
use custos_contracts::{AuditLogEntry, ChainFault, ChainReport, CustosResult};

/// Replays the audit chain against a store and reports every mismatch.
///
/// # Behavior after a break
///
/// After recording a fault, the expected previous hash advances to the
/// entry's *stored* hash, so downstream entries are verified against their
/// own stored chain rather than flagged wholesale. A suffix restored from
/// a backup that is internally consistent therefore yields exactly one
/// fault at the restore point; `broken_at` pins the first break and
/// `faults` carries the full extent.
#[derive(Debug, Default)]
pub struct ChainVerifier;

impl ChainVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify all entries with `sequence >= from_sequence`.
    ///
    /// When resuming mid-chain, the expected previous hash is taken from
    /// the stored hash of the entry immediately before `from_sequence`;
    /// from genesis otherwise. The scan is read-only and tolerates entries
    /// appended after it begins — a point-in-time prefix is sufficient.
    pub fn verify(&self, store: &dyn AuditStore, from_sequence: u64) -> CustosResult<ChainReport> {
        let mut expected_prev = if from_sequence == 0 {
            AuditLogEntry::GENESIS_HASH.to_string()
        } else {
            match store.get(from_sequence - 1)? {
                Some(prev) => prev
                    .hash
                    .unwrap_or_else(|| AuditLogEntry::GENESIS_HASH.to_string()),
                None => AuditLogEntry::GENESIS_HASH.to_string(),
            }
        };

        let mut report = ChainReport::empty();

        for entry in store.load_from(from_sequence)? {
            report.total_checked += 1;

            // Legacy pre-chain rows carry no hash: they are counted but
            // never verified, and the chain restarts after them.
            let Some(stored_hash) = entry.hash.clone() else {
                expected_prev = AuditLogEntry::GENESIS_HASH.to_string();
                continue;
            };
            report.total_with_hash += 1;

            if entry.prev_hash.as_deref() != Some(expected_prev.as_str()) {
                record_fault(
                    &mut report,
                    entry.sequence,
                    format!(
                        "prev_hash mismatch at sequence {}: expected {}, stored {}",
                        entry.sequence,
                        expected_prev,
                        entry.prev_hash.as_deref().unwrap_or("<none>")
                    ),
                );
            }

            let recomputed = hash_entry(&entry, &expected_prev);
            if recomputed != stored_hash {
                record_fault(
                    &mut report,
                    entry.sequence,
                    format!(
                        "hash mismatch at sequence {}: entry content does not match stored hash",
                        entry.sequence
                    ),
                );
            }

            // Advance along the *stored* chain so a single break does not
            // cascade into false positives for every later entry.
            expected_prev = stored_hash;
        }

        report.valid = report.faults.is_empty();

        debug!(
            from_sequence,
            total_checked = report.total_checked,
            total_with_hash = report.total_with_hash,
            valid = report.valid,
            "chain verification complete"
        );

        Ok(report)
    }
}

fn record_fault(report: &mut ChainReport, sequence: u64, message: String) {
    warn!(sequence, %message, "audit chain fault");
    if report.broken_at.is_none() {
        report.broken_at = Some(sequence);
    }
    report.faults.push(ChainFault { sequence, message });
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use serde_json::json;

    use custos_audit::{AuditLogWriter, MemoryAuditStore};
    use custos_contracts::{AuditAction, AuditLogEntry, RequestContext};
    use custos_context::bind;

    use super::ChainVerifier;

    /// Append `n` Sale entries for tenant t1 and return the store.
    fn chain_of(n: usize) -> Arc<MemoryAuditStore> {
        let store = Arc::new(MemoryAuditStore::new());
        let writer = AuditLogWriter::new(store.clone()).unwrap();
        bind(RequestContext::with_request_id("req-1").with_tenant("t1"), || {
            for i in 0..n {
                writer
                    .append("Sale", format!("sale-{}", i), AuditAction::Create, json!({ "n": i }))
                    .unwrap();
            }
        });
        store
    }

    /// An untouched chain verifies clean.
    #[test]
    fn valid_chain_passes() {
        let store = chain_of(5);
        let report = ChainVerifier::new().verify(&*store, 0).unwrap();

        assert!(report.valid);
        assert_eq!(report.total_checked, 5);
        assert_eq!(report.total_with_hash, 5);
        assert!(report.broken_at.is_none());
        assert!(report.faults.is_empty());
    }

    /// An empty store yields an empty, valid report.
    #[test]
    fn empty_store_is_valid() {
        let store = MemoryAuditStore::new();
        let report = ChainVerifier::new().verify(&store, 0).unwrap();
        assert!(report.valid);
        assert_eq!(report.total_checked, 0);
    }

    /// Verification is read-only: two runs over an unmodified log are
    /// identical.
    #[test]
    fn verification_is_idempotent() {
        let store = chain_of(4);
        let verifier = ChainVerifier::new();
        let first = verifier.verify(&*store, 0).unwrap();
        let second = verifier.verify(&*store, 0).unwrap();
        assert_eq!(first, second);
    }

    /// Three Sale creates for t1, then the second
    /// entry's diff is corrupted directly in storage.
    #[test]
    fn corrupted_diff_is_located_exactly() {
        let store = chain_of(3);

        let mut entries = store.export().unwrap();
        entries[1].diff = json!({ "n": "TAMPERED" });
        let store = MemoryAuditStore::from_entries(entries);

        let report = ChainVerifier::new().verify(&store, 0).unwrap();

        assert!(!report.valid);
        assert_eq!(report.total_checked, 3);
        assert_eq!(report.total_with_hash, 3);
        assert_eq!(report.broken_at, Some(1));
        assert_eq!(report.faults.len(), 1, "downstream entries still chain on the stored hash");
        assert!(report.faults[0].message.contains("sequence 1"));
    }

    /// Tampering with any single entry is pinned to that sequence.
    #[test]
    fn each_position_is_detected() {
        for victim in 0..3u64 {
            let store = chain_of(3);
            let mut entries = store.export().unwrap();
            entries[victim as usize].entity_id = "forged".to_string();
            let store = MemoryAuditStore::from_entries(entries);

            let report = ChainVerifier::new().verify(&store, 0).unwrap();
            assert!(!report.valid);
            assert_eq!(report.broken_at, Some(victim), "victim at sequence {}", victim);
        }
    }

    /// A re-linked prev_hash is a linkage fault even when the stored hash
    /// still matches the entry's own content.
    #[test]
    fn broken_linkage_is_reported() {
        let store = chain_of(3);
        let mut entries = store.export().unwrap();
        entries[1].prev_hash = Some("ab".repeat(32));
        let store = MemoryAuditStore::from_entries(entries);

        let report = ChainVerifier::new().verify(&store, 0).unwrap();
        assert!(!report.valid);
        assert_eq!(report.broken_at, Some(1));
        assert!(report.faults.iter().any(|f| f.message.contains("prev_hash mismatch")));
    }

    /// Legacy rows without hashes are counted but never faulted, and the
    /// chain restarts at genesis after them.
    #[test]
    fn legacy_rows_are_tolerated() {
        let legacy = AuditLogEntry {
            sequence: 0,
            entity: "Sale".to_string(),
            entity_id: "legacy-1".to_string(),
            action: AuditAction::Create,
            diff: json!({}),
            actor_id: None,
            tenant_id: None,
            request_id: None,
            ip: None,
            user_agent: None,
            created_at: Utc::now(),
            prev_hash: None,
            hash: None,
        };

        let store = Arc::new(MemoryAuditStore::from_entries(vec![legacy]));
        let writer = AuditLogWriter::new(store.clone()).unwrap();
        writer.append("Sale", "sale-1", AuditAction::Create, json!({})).unwrap();
        writer.append("Sale", "sale-2", AuditAction::Update, json!({})).unwrap();

        let report = ChainVerifier::new().verify(&*store, 0).unwrap();
        assert!(report.valid);
        assert_eq!(report.total_checked, 3);
        assert_eq!(report.total_with_hash, 2);
    }

    /// Resuming from a mid-chain sequence uses the stored hash of the
    /// preceding entry and scans only the suffix.
    #[test]
    fn resumes_from_sequence() {
        let store = chain_of(6);
        let verifier = ChainVerifier::new();

        let report = verifier.verify(&*store, 3).unwrap();
        assert!(report.valid);
        assert_eq!(report.total_checked, 3);

        // A fault inside the suffix is still caught when resuming.
        let mut entries = store.export().unwrap();
        entries[4].diff = json!({ "n": 999 });
        let store = MemoryAuditStore::from_entries(entries);

        let report = verifier.verify(&store, 3).unwrap();
        assert!(!report.valid);
        assert_eq!(report.broken_at, Some(4));
    }

    /// Entries appended after a scan begins do not disturb a completed
    /// prefix verification.
    #[test]
    fn prefix_remains_valid_under_later_appends() {
        let store = chain_of(3);
        let verifier = ChainVerifier::new();
        let before = verifier.verify(&*store, 0).unwrap();

        let writer = AuditLogWriter::new(store.clone()).unwrap();
        writer.append("Sale", "sale-late", AuditAction::Create, json!({})).unwrap();

        let after = verifier.verify(&*store, 0).unwrap();
        assert!(before.valid && after.valid);
        assert_eq!(after.total_checked, before.total_checked + 1);
    }
}
