//! The tenant query guard.
//!
//! Wraps every data-access call as an explicit, injected decorator around
//! the repository seam — not a globally patched client — so the
//! interception point is visible and testable in isolation.

use tracing::warn;

use custos_contracts::{DataOperation, GuardWarning};

use crate::{
    catalog::GuardCatalog,
    predicate::{inspect_filter, TenantScoping},
};

/// Observational tenant-scoping check around data-access operations.
///
/// # Observe-only, by design
///
/// The guard never blocks, rewrites, or denies the underlying operation;
/// detection-over-prevention is a deliberate product decision, not an
/// omission. There is no enforcing mode. Likewise, a filter shape the
/// inspector cannot understand produces *no* warning — the guard fails
/// closed to silence rather than disrupting the caller.
///
/// # Cost
///
/// `inspect` performs in-memory set lookups and a shallow walk of the
/// filter JSON. It makes no data-access calls of its own and holds no
/// locks, so it adds negligible latency to every intercepted call.
#[derive(Debug, Clone, Default)]
pub struct TenantQueryGuard {
    catalog: GuardCatalog,
}

impl TenantQueryGuard {
    /// Build a guard over the compiled-in default catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a guard over an explicit catalog.
    pub fn with_catalog(catalog: GuardCatalog) -> Self {
        Self { catalog }
    }

    /// Inspect one data-access operation against the ambient context.
    ///
    /// Emits a structured warning — and returns it as data — when a
    /// tenant-scoped entity is hit by a risk-catalog action without a
    /// tenant constraint while a tenant context is active. Every other
    /// combination is a no-op returning `None`:
    /// entity declared system (tenant-agnostic, checked before anything
    /// else), entity not tenant-scoped, action not risky, no ambient tenant
    /// (platform actors get unscoped access by design), filter already
    /// scoped, or filter uninspectable.
    pub fn inspect(&self, op: &DataOperation) -> Option<GuardWarning> {
        // A declared system entity wins over tenant_scoped membership.
        if self.catalog.system_entities.contains(&op.entity) {
            return None;
        }
        if !self.catalog.tenant_scoped.contains(&op.entity) {
            return None;
        }
        if !self.catalog.risk_actions.contains(&op.action) {
            return None;
        }

        let tenant_id = custos_context::current().and_then(|c| c.tenant_id)?;

        match inspect_filter(&op.filter, &self.catalog.tenant_field) {
            TenantScoping::Constrained | TenantScoping::Unknown => None,
            TenantScoping::Unconstrained => {
                let request_id = custos_context::current().map(|c| c.request_id);
                warn!(
                    entity = %op.entity,
                    action = %op.action,
                    tenant_id = %tenant_id,
                    request_id = request_id.as_deref().unwrap_or("-"),
                    "tenant-scoped entity accessed without tenant filter"
                );
                Some(GuardWarning {
                    entity: op.entity.clone(),
                    action: op.action.as_str().to_string(),
                    tenant_id,
                    request_id,
                })
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
