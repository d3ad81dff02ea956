//! Per-request audit context.
//!
//! A `RequestContext` is built once at the start of request handling and
//! bound for the request's duration via `custos-context`. It is never
//! persisted directly — its fields are copied into `AuditLogEntry` at
//! write time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted user-agent string; anything longer is truncated.
pub const MAX_USER_AGENT_LEN: usize = 256;

/// Longest textual IP address we accept (IPv6 with scope id headroom).
pub const MAX_IP_LEN: usize = 45;

/// Immutable per-request identity and network metadata.
///
/// `tenant_id = None` denotes a platform-level actor operating outside any
/// single tenant boundary — a valid state, not an error. The same applies
/// to every other optional field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Opaque id unique to this inbound request.
    pub request_id: String,

    /// The tenant the actor is operating within, if any.
    pub tenant_id: Option<String>,

    /// The authenticated actor, if any.
    pub actor_id: Option<String>,

    /// Client IP, sanitized and length-capped.
    pub ip: Option<String>,

    /// Client user agent, length-capped.
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Create a context with a freshly generated request id and no actor,
    /// tenant, or network metadata.
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4().to_string())
    }

    /// Create a context carrying a caller-supplied request id.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            tenant_id: None,
            actor_id: None,
            ip: None,
            user_agent: None,
        }
    }

    /// Set the tenant the request is scoped to.
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the authenticated actor.
    #[must_use]
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Set the client IP. Whitespace is trimmed, empty values are dropped,
    /// and anything longer than `MAX_IP_LEN` is truncated.
    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        let ip = ip.into();
        let trimmed = ip.trim();
        self.ip = if trimmed.is_empty() {
            None
        } else {
            Some(truncate_chars(trimmed, MAX_IP_LEN))
        };
        self
    }

    /// Set the client user agent, truncated to `MAX_USER_AGENT_LEN`.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let ua = user_agent.into();
        let trimmed = ua.trim();
        self.user_agent = if trimmed.is_empty() {
            None
        } else {
            Some(truncate_chars(trimmed, MAX_USER_AGENT_LEN))
        };
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate on a character boundary so capped fields stay valid UTF-8.
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
