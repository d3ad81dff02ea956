//! The single producer of new chain entries.
//!
//! `AuditLogWriter` is the only component allowed to append to the chain.
//! It stamps actor/tenant/request metadata from the ambient request
//! context, assigns the next sequence, computes the chained hash, and
//! persists through the `AuditStore` seam — all under one mutex, so two
//! concurrent appends can never share a `prev_hash` or a sequence number.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use custos_contracts::{AuditAction, AuditLogEntry, CustosError, CustosResult};

use crate::{chain::hash_entry, store::AuditStore};

/// The writer's chain cursor: what the next entry will link to.
struct WriterState {
    /// The next sequence number to assign.
    next_sequence: u64,

    /// The stored hash of the last appended entry, or the genesis constant
    /// before any hashed entry exists.
    last_hash: String,
}

/// Appends hash-chained audit entries through an `AuditStore`.
///
/// # Concurrency
///
/// The entire append path — read last hash, canonicalize, hash, persist,
/// advance — runs under one internal mutex. This is the single
/// serialization point of the audit core: callers on any thread may share
/// the writer via `Arc` and the resulting chain is always linear.
///
/// # Failure semantics
///
/// A store failure surfaces as `CustosError::WriteFailed` and leaves the
/// cursor unchanged; the writer never reports success for an entry the
/// store did not accept, and never retries on its own. Whether the
/// triggering business operation rolls back is the caller's policy.
pub struct AuditLogWriter {
    store: Arc<dyn AuditStore>,
    state: Mutex<WriterState>,
}

impl AuditLogWriter {
    /// Create a writer over `store`, resuming the chain from the store's
    /// current head.
    ///
    /// If the head is a legacy row without a hash, the chain restarts at
    /// the genesis constant — the same rule the verifier applies.
    pub fn new(store: Arc<dyn AuditStore>) -> CustosResult<Self> {
        let state = match store.head()? {
            Some(head) => WriterState {
                next_sequence: head.sequence + 1,
                last_hash: head
                    .hash
                    .unwrap_or_else(|| AuditLogEntry::GENESIS_HASH.to_string()),
            },
            None => WriterState {
                next_sequence: 0,
                last_hash: AuditLogEntry::GENESIS_HASH.to_string(),
            },
        };

        Ok(Self {
            store,
            state: Mutex::new(state),
        })
    }

    /// Append one audit entry and return it with its final hash.
    ///
    /// Actor, tenant, request id, IP and user agent are stamped from the
    /// ambient `custos_context::current()`. When no context is bound the
    /// fields are recorded as absent and the write still succeeds —
    /// background and system-initiated events are legitimate.
    pub fn append(
        &self,
        entity: impl Into<String>,
        entity_id: impl Into<String>,
        action: AuditAction,
        diff: Value,
    ) -> CustosResult<AuditLogEntry> {
        let ctx = custos_context::current();

        let mut state = self.state.lock().map_err(|e| CustosError::WriteFailed {
            reason: format!("writer lock poisoned: {}", e),
        })?;

        let prev_hash = state.last_hash.clone();

        let mut entry = AuditLogEntry {
            sequence: state.next_sequence,
            entity: entity.into(),
            entity_id: entity_id.into(),
            action,
            diff,
            actor_id: ctx.as_ref().and_then(|c| c.actor_id.clone()),
            tenant_id: ctx.as_ref().and_then(|c| c.tenant_id.clone()),
            request_id: ctx.as_ref().map(|c| c.request_id.clone()),
            ip: ctx.as_ref().and_then(|c| c.ip.clone()),
            user_agent: ctx.as_ref().and_then(|c| c.user_agent.clone()),
            created_at: Utc::now(),
            prev_hash: Some(prev_hash.clone()),
            hash: None,
        };

        let hash = hash_entry(&entry, &prev_hash);
        entry.hash = Some(hash.clone());

        // Persist before advancing the cursor: a rejected entry must leave
        // the chain exactly as it was.
        self.store
            .append(entry.clone())
            .map_err(|e| CustosError::WriteFailed {
                reason: e.to_string(),
            })?;

        state.next_sequence += 1;
        state.last_hash = hash;

        debug!(
            sequence = entry.sequence,
            entity = %entry.entity,
            action = %entry.action,
            tenant_id = entry.tenant_id.as_deref().unwrap_or("-"),
            "audit entry appended"
        );

        Ok(entry)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
