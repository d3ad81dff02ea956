//! Audit log entry types.
//!
//! `AuditLogEntry` is a single link in the hash chain. Entries are
//! immutable post-write: no update or delete path exists anywhere in the
//! workspace, and retention is an explicit external policy, never silent
//! deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The audited action that produced an entry.
///
/// Serialized as a plain string (`"create"`, `"login_failed"`, …) so log
/// files stay greppable; unknown strings deserialize as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Access,
    Login,
    Logout,
    LoginFailed,
    StatusChange,
    /// Caller-defined action outside the fixed set.
    Custom(String),
}

impl AuditAction {
    /// The stable string form used in storage and in canonical hashing.
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Access => "access",
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::StatusChange => "status_change",
            AuditAction::Custom(s) => s,
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AuditAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "create" => AuditAction::Create,
            "update" => AuditAction::Update,
            "delete" => AuditAction::Delete,
            "access" => AuditAction::Access,
            "login" => AuditAction::Login,
            "logout" => AuditAction::Logout,
            "login_failed" => AuditAction::LoginFailed,
            "status_change" => AuditAction::StatusChange,
            _ => AuditAction::Custom(s),
        }
    }
}

impl From<AuditAction> for String {
    fn from(a: AuditAction) -> Self {
        a.as_str().to_string()
    }
}

/// A single entry in the SHA-256 hash chain.
///
/// Each entry commits to the previous entry via `prev_hash`, forming an
/// append-only chain ordered by `sequence`. Modifying any stamped field —
/// including the opaque `diff` payload — invalidates `hash`, which the
/// chain verifier detects.
///
/// `prev_hash`/`hash` are optional only to admit legacy rows written
/// before chaining existed; the writer always populates both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Monotonically increasing, gapless position in the chain.
    pub sequence: u64,

    /// The audited resource type, e.g. `"Sale"`.
    pub entity: String,

    /// Identifier of the audited resource instance.
    pub entity_id: String,

    /// What happened to the resource.
    pub action: AuditAction,

    /// Opaque structured payload describing what changed. Never validated
    /// by the audit core — hashed and stored verbatim.
    pub diff: serde_json::Value,

    /// Actor stamped from the ambient request context, if one was bound.
    pub actor_id: Option<String>,

    /// Tenant stamped from the ambient request context, if one was bound.
    pub tenant_id: Option<String>,

    /// Request id stamped from the ambient request context.
    pub request_id: Option<String>,

    /// Client IP stamped from the ambient request context.
    pub ip: Option<String>,

    /// Client user agent stamped from the ambient request context.
    pub user_agent: Option<String>,

    /// Wall-clock time (UTC) the entry was written.
    pub created_at: DateTime<Utc>,

    /// Hash of the previous entry, or `GENESIS_HASH` for sequence 0.
    /// `None` only on legacy pre-chain rows.
    pub prev_hash: Option<String>,

    /// SHA-256 (hex) of this entry's canonical serialization concatenated
    /// with `prev_hash`. `None` only on legacy pre-chain rows.
    pub hash: Option<String>,
}

impl AuditLogEntry {
    /// The sentinel `prev_hash` for the first entry in the chain.
    ///
    /// 64 hex zeros — never the SHA-256 of real data, so genesis detection
    /// is unambiguous.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Known actions round-trip through their string form.
    #[test]
    fn action_string_round_trip() {
        for action in [
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Delete,
            AuditAction::Access,
            AuditAction::Login,
            AuditAction::Logout,
            AuditAction::LoginFailed,
            AuditAction::StatusChange,
        ] {
            let s = action.as_str().to_string();
            assert_eq!(AuditAction::from(s), action);
        }
    }

    /// Unknown action strings become Custom rather than failing.
    #[test]
    fn unknown_action_becomes_custom() {
        let action = AuditAction::from("invoice_reissued".to_string());
        assert_eq!(action, AuditAction::Custom("invoice_reissued".to_string()));
        assert_eq!(action.as_str(), "invoice_reissued");
    }

    /// Actions serialize as bare JSON strings, not tagged objects.
    #[test]
    fn action_serializes_as_plain_string() {
        let json = serde_json::to_string(&AuditAction::LoginFailed).unwrap();
        assert_eq!(json, "\"login_failed\"");

        let back: AuditAction = serde_json::from_str("\"status_change\"").unwrap();
        assert_eq!(back, AuditAction::StatusChange);
    }

    /// The genesis constant is 64 hex zeros.
    #[test]
    fn genesis_constant_shape() {
        assert_eq!(AuditLogEntry::GENESIS_HASH.len(), 64);
        assert!(AuditLogEntry::GENESIS_HASH.chars().all(|c| c == '0'));
    }
}
