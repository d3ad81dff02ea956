//! Shallow filter-predicate inspection.
//!
//! The repository layer hands the guard its `where` clause as JSON. The
//! only question asked here is whether that predicate pins the query to a
//! tenant — never whether it pins it to the *right* tenant, which would
//! require evaluating the predicate.

use serde_json::Value;

/// What the inspection concluded about a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScoping {
    /// The predicate constrains the tenant field on every path.
    Constrained,
    /// The predicate can match rows regardless of tenant.
    Unconstrained,
    /// The predicate has a shape this inspector does not understand.
    /// The guard fails closed to "no warning" on this value.
    Unknown,
}

/// Inspect `filter` for a constraint on `tenant_field`.
///
/// Understood shapes:
/// - `null` — no filter at all: `Unconstrained`.
/// - an object — `Constrained` when the tenant field is present with a
///   non-null value, or when an `AND` branch constrains it, or when
///   *every* `OR` branch constrains it (one unscoped alternative opens
///   the whole disjunction). `NOT` never counts as a constraint.
/// - anything else — `Unknown`.
pub fn inspect_filter(filter: &Value, tenant_field: &str) -> TenantScoping {
    match filter {
        Value::Null => TenantScoping::Unconstrained,
        Value::Object(_) => {
            if constrains(filter, tenant_field) {
                TenantScoping::Constrained
            } else {
                TenantScoping::Unconstrained
            }
        }
        _ => TenantScoping::Unknown,
    }
}

fn constrains(filter: &Value, tenant_field: &str) -> bool {
    let Value::Object(map) = filter else {
        return false;
    };

    if matches!(map.get(tenant_field), Some(v) if !v.is_null()) {
        return true;
    }

    // AND: one constrained branch scopes the whole conjunction.
    if let Some(and) = map.get("AND") {
        let scoped = match and {
            Value::Array(branches) => branches.iter().any(|b| constrains(b, tenant_field)),
            nested @ Value::Object(_) => constrains(nested, tenant_field),
            _ => false,
        };
        if scoped {
            return true;
        }
    }

    // OR: every branch must be constrained, or one alternative leaks.
    if let Some(Value::Array(branches)) = map.get("OR") {
        if !branches.is_empty() && branches.iter().all(|b| constrains(b, tenant_field)) {
            return true;
        }
    }

    false
}

// ── Tests ─────────────────────────────────────────────────────────────────────
