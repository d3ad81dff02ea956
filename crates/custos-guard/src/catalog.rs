//! The guard's entity and action catalogs.
//!
//! Which entity types are tenant-scoped, which are intentionally
//! tenant-agnostic, and which actions carry unscoped-leak risk is fixed
//! configuration: compiled-in defaults matching the business domain, with
//! a TOML override for deployments whose schema differs.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use custos_contracts::{CustosError, CustosResult, QueryAction};

/// The guard's fixed configuration.
///
/// Missing TOML keys fall back to the compiled-in defaults, so an override
/// file only needs to name what differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardCatalog {
    /// Entity types that must always carry and filter by a tenant id.
    #[serde(default = "default_tenant_scoped")]
    pub tenant_scoped: HashSet<String>,

    /// Entity types that are intentionally tenant-agnostic; never warned
    /// about, even with an active tenant context.
    #[serde(default = "default_system_entities")]
    pub system_entities: HashSet<String>,

    /// Multi-row actions that can leak across tenants when unscoped.
    /// Single-row-by-key lookups are deliberately absent.
    #[serde(default = "default_risk_actions")]
    pub risk_actions: HashSet<QueryAction>,

    /// The field name carrying the tenant id in filter predicates.
    #[serde(default = "default_tenant_field")]
    pub tenant_field: String,
}

fn default_tenant_scoped() -> HashSet<String> {
    [
        "Sale",
        "SaleItem",
        "Product",
        "Customer",
        "Invoice",
        "InvoiceItem",
        "Payment",
        "StockMovement",
        "Expense",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_system_entities() -> HashSet<String> {
    ["Tenant", "PlatformSetting", "AuditLog"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_risk_actions() -> HashSet<QueryAction> {
    [
        QueryAction::FindMany,
        QueryAction::UpdateMany,
        QueryAction::DeleteMany,
        QueryAction::Aggregate,
        QueryAction::Count,
        QueryAction::GroupBy,
    ]
    .into_iter()
    .collect()
}

fn default_tenant_field() -> String {
    "tenant_id".to_string()
}

impl Default for GuardCatalog {
    fn default() -> Self {
        Self {
            tenant_scoped: default_tenant_scoped(),
            system_entities: default_system_entities(),
            risk_actions: default_risk_actions(),
            tenant_field: default_tenant_field(),
        }
    }
}

impl GuardCatalog {
    /// Parse `s` as a TOML catalog override.
    pub fn from_toml_str(s: &str) -> CustosResult<Self> {
        toml::from_str(s).map_err(|e| CustosError::ConfigError {
            reason: format!("failed to parse guard catalog TOML: {}", e),
        })
    }

    /// Read and parse the catalog file at `path`.
    pub fn from_file(path: &Path) -> CustosResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CustosError::ConfigError {
            reason: format!("failed to read guard catalog '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
