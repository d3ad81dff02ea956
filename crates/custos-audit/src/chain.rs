//! Hash-chain primitives: entry hashing and link verification.
//!
//! Every field that contributes to an entry's hash is listed explicitly so
//! nothing is accidentally omitted.
//!
//! Hash input layout (bytes, in order):
//!   1. canonical JSON object of the entry's stamped fields, with keys
//!      sorted and nulls explicit (see `canonical`):
//!      action, actor_id, created_at (RFC 3339 UTC, microseconds, `Z`),
//!      diff, entity, entity_id, ip, request_id, sequence, tenant_id,
//!      user_agent
//!   2. prev_hash as UTF-8 bytes (64 ASCII hex chars, or the genesis
//!      constant for sequence 0)
//!
//! `prev_hash` and `hash` themselves are never part of the canonical
//! object; the link is committed only through step 2.

use chrono::SecondsFormat;
use serde_json::json;
use sha2::{Digest, Sha256};

use custos_contracts::AuditLogEntry;

use crate::canonical::canonical_json;

/// The canonical byte representation of an entry's stamped fields.
///
/// Absent optional fields are written as explicit JSON nulls so an entry
/// recorded without an ambient context hashes deterministically.
pub fn canonical_entry_bytes(entry: &AuditLogEntry) -> Vec<u8> {
    let fields = json!({
        "action": entry.action.as_str(),
        "actor_id": entry.actor_id,
        "created_at": entry.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        "diff": entry.diff,
        "entity": entry.entity,
        "entity_id": entry.entity_id,
        "ip": entry.ip,
        "request_id": entry.request_id,
        "sequence": entry.sequence,
        "tenant_id": entry.tenant_id,
        "user_agent": entry.user_agent,
    });
    canonical_json(&fields).into_bytes()
}

/// Compute the SHA-256 hash (lowercase hex) for one entry.
///
/// A pure function of the entry's stamped fields and `prev_hash` — the
/// same inputs yield the same hash on every platform, which is what makes
/// chain verification meaningful.
pub fn hash_entry(entry: &AuditLogEntry, prev_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_entry_bytes(entry));
    hasher.update(prev_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// Quick boolean integrity check over an in-order slice of entries.
///
/// Applies both chain rules to every hashed entry:
///
/// 1. **Prev-hash linkage** — `prev_hash` equals the hash of the preceding
///    hashed entry (or the genesis constant at the start of the chain).
/// 2. **Hash correctness** — `hash` matches the value recomputed from the
///    entry's own fields.
///
/// Legacy entries without a hash are skipped; the chain restarts at
/// genesis after them. Returns `false` at the first mismatch. The full
/// reporting verifier lives in `custos-verify`; this helper exists for
/// writers and tests that only need a yes/no answer.
pub fn verify_links(entries: &[AuditLogEntry]) -> bool {
    let mut expected_prev = AuditLogEntry::GENESIS_HASH.to_string();

    for entry in entries {
        let Some(stored_hash) = entry.hash.as_deref() else {
            // Pre-chain row: nothing to verify, chain restarts after it.
            expected_prev = AuditLogEntry::GENESIS_HASH.to_string();
            continue;
        };

        if entry.prev_hash.as_deref() != Some(expected_prev.as_str()) {
            return false;
        }
        if hash_entry(entry, &expected_prev) != stored_hash {
            return false;
        }

        expected_prev = stored_hash.to_string();
    }

    true
}

// ── Tests ─────────────────────────────────────────────────────────────────────
