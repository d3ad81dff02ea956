//! The auditor's catalog: which entities are tenant-scoped, which may
//! legitimately carry null tenants, which are hot enough to need a
//! composite index, and which parent→child relationships must agree on
//! tenancy.
//!
//! Compiled-in defaults match the business domain; a TOML file overrides
//! only the keys it names.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use custos_contracts::{CustosError, CustosResult};

/// A declared parent→child relationship where both sides carry a tenant id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub parent: String,
    pub child: String,
}

/// Fixed configuration for the isolation auditor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationCatalog {
    /// Entity types that must always carry a tenant id.
    #[serde(default = "default_tenant_scoped")]
    pub tenant_scoped: Vec<String>,

    /// Tenant-scoped entities where a null tenant id is intentionally
    /// allowed (system-generated rows); reported as informational, never
    /// as a failure.
    #[serde(default = "default_null_exempt")]
    pub null_exempt: HashSet<String>,

    /// High-traffic entities expected to have a composite index that
    /// includes the tenant id. Advisory: absence is a performance risk,
    /// not a correctness failure.
    #[serde(default = "default_high_traffic")]
    pub high_traffic: Vec<String>,

    /// Parent→child pairs whose tenant ids must agree.
    #[serde(default = "default_relationships")]
    pub relationships: Vec<Relationship>,

    /// The column/field name carrying the tenant id.
    #[serde(default = "default_tenant_field")]
    pub tenant_field: String,
}

fn default_tenant_scoped() -> Vec<String> {
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
        "AuditLog",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_null_exempt() -> HashSet<String> {
    // Audit entries written by background jobs legitimately have no tenant.
    ["AuditLog"].into_iter().map(str::to_string).collect()
}

fn default_high_traffic() -> Vec<String> {
    ["Sale", "SaleItem", "Invoice", "Payment", "StockMovement"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_relationships() -> Vec<Relationship> {
    [
        ("Customer", "Sale"),
        ("Sale", "SaleItem"),
        ("Invoice", "InvoiceItem"),
        ("Invoice", "Payment"),
    ]
    .into_iter()
    .map(|(parent, child)| Relationship {
        parent: parent.to_string(),
        child: child.to_string(),
    })
    .collect()
}

fn default_tenant_field() -> String {
    "tenant_id".to_string()
}

impl Default for IsolationCatalog {
    fn default() -> Self {
        Self {
            tenant_scoped: default_tenant_scoped(),
            null_exempt: default_null_exempt(),
            high_traffic: default_high_traffic(),
            relationships: default_relationships(),
            tenant_field: default_tenant_field(),
        }
    }
}

impl IsolationCatalog {
    /// Parse `s` as a TOML catalog override.
    pub fn from_toml_str(s: &str) -> CustosResult<Self> {
        toml::from_str(s).map_err(|e| CustosError::ConfigError {
            reason: format!("failed to parse isolation catalog TOML: {}", e),
        })
    }

    /// Read and parse the catalog file at `path`.
    pub fn from_file(path: &Path) -> CustosResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CustosError::ConfigError {
            reason: format!("failed to read isolation catalog '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::IsolationCatalog;

    /// The defaults cover the business entities and exempt system rows.
    #[test]
    fn defaults_are_sensible() {
        let catalog = IsolationCatalog::default();
        assert!(catalog.tenant_scoped.iter().any(|e| e == "Sale"));
        assert!(catalog.null_exempt.contains("AuditLog"));
        assert!(!catalog.null_exempt.contains("Sale"));
        assert!(catalog
            .relationships
            .iter()
            .any(|r| r.parent == "Sale" && r.child == "SaleItem"));
    }

    /// Relationships can be declared in TOML as tables.
    #[test]
    fn relationships_parse_from_toml() {
        let catalog = IsolationCatalog::from_toml_str(
            r#"
            tenant_scoped = ["Order", "Shipment"]

            [[relationships]]
            parent = "Order"
            child = "Shipment"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.relationships.len(), 1);
        assert_eq!(catalog.relationships[0].parent, "Order");
        // Omitted keys keep their defaults.
        assert_eq!(catalog.tenant_field, "tenant_id");
    }
}
