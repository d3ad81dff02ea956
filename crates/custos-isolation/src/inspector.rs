//! The persisted-state seam between the auditor and its storage
//! collaborator.
//!
//! The auditor never talks to a database. It asks a `StateInspector` for
//! rows, schema facts, and linked parent/child pairs, and judges what it
//! gets. `MemoryStateInspector` is the reference implementation over a
//! serde-loadable `Dataset` — it backs the tests and the CLI, which feeds
//! it a JSON snapshot exported from the real store.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use custos_contracts::{CustosError, CustosResult};

/// One persisted row, reduced to what isolation checks care about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRow {
    pub id: String,

    /// The row's tenant id; `None` is what the orphan check hunts for.
    pub tenant_id: Option<String>,

    /// References to parent rows: parent entity type → parent row id.
    #[serde(default)]
    pub refs: BTreeMap<String, String>,
}

/// A child row joined to the parent row it references.
#[derive(Debug, Clone)]
pub struct LinkedRow {
    pub child_id: String,
    pub child_tenant_id: Option<String>,
    pub parent_id: String,
    pub parent_tenant_id: Option<String>,
}

/// Read-only access to persisted state for isolation auditing.
///
/// Implementations must be side-effect free: the auditor may run
/// concurrently with live traffic and must never block it.
pub trait StateInspector: Send + Sync {
    /// All rows of `entity`. Unknown entities yield an empty set — a
    /// catalog naming an entity the store has never seen is not an error.
    fn rows(&self, entity: &str) -> CustosResult<Vec<EntityRow>>;

    /// Column lists of every index on `entity`, multi-column or not.
    fn indexes(&self, entity: &str) -> CustosResult<Vec<Vec<String>>>;

    /// Column lists of every unique constraint on `entity`.
    fn unique_constraints(&self, entity: &str) -> CustosResult<Vec<Vec<String>>>;

    /// Every `child` row that references a `parent` row, joined to it.
    /// Rows without such a reference, or whose referenced parent does not
    /// exist, are not included.
    fn linked_rows(&self, parent: &str, child: &str) -> CustosResult<Vec<LinkedRow>>;

    /// The ids of every existing tenant record.
    fn tenant_ids(&self) -> CustosResult<HashSet<String>>;
}

/// Schema and row facts for one entity type in a `Dataset`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityState {
    #[serde(default)]
    pub rows: Vec<EntityRow>,

    #[serde(default)]
    pub indexes: Vec<Vec<String>>,

    #[serde(default)]
    pub unique_constraints: Vec<Vec<String>>,
}

/// A point-in-time snapshot of persisted state, as the CLI consumes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Ids of existing tenant records.
    #[serde(default)]
    pub tenants: Vec<String>,

    /// Entity type → rows and schema facts.
    #[serde(default)]
    pub entities: BTreeMap<String, EntityState>,
}

/// `StateInspector` over an in-memory `Dataset`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateInspector {
    dataset: Dataset,
}

impl MemoryStateInspector {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Parse a JSON snapshot into an inspector.
    pub fn from_json_str(s: &str) -> CustosResult<Self> {
        let dataset: Dataset = serde_json::from_str(s).map_err(|e| CustosError::ConfigError {
            reason: format!("failed to parse state snapshot JSON: {}", e),
        })?;
        Ok(Self::new(dataset))
    }

    fn entity(&self, entity: &str) -> Option<&EntityState> {
        self.dataset.entities.get(entity)
    }
}

impl StateInspector for MemoryStateInspector {
    fn rows(&self, entity: &str) -> CustosResult<Vec<EntityRow>> {
        Ok(self.entity(entity).map(|e| e.rows.clone()).unwrap_or_default())
    }

    fn indexes(&self, entity: &str) -> CustosResult<Vec<Vec<String>>> {
        Ok(self.entity(entity).map(|e| e.indexes.clone()).unwrap_or_default())
    }

    fn unique_constraints(&self, entity: &str) -> CustosResult<Vec<Vec<String>>> {
        Ok(self
            .entity(entity)
            .map(|e| e.unique_constraints.clone())
            .unwrap_or_default())
    }

    fn linked_rows(&self, parent: &str, child: &str) -> CustosResult<Vec<LinkedRow>> {
        let Some(children) = self.entity(child) else {
            return Ok(Vec::new());
        };
        let parent_rows: BTreeMap<&str, &EntityRow> = self
            .entity(parent)
            .map(|e| e.rows.iter().map(|r| (r.id.as_str(), r)).collect())
            .unwrap_or_default();

        let mut linked = Vec::new();
        for child_row in &children.rows {
            let Some(parent_id) = child_row.refs.get(parent) else {
                continue;
            };
            let Some(parent_row) = parent_rows.get(parent_id.as_str()) else {
                continue;
            };
            linked.push(LinkedRow {
                child_id: child_row.id.clone(),
                child_tenant_id: child_row.tenant_id.clone(),
                parent_id: parent_id.clone(),
                parent_tenant_id: parent_row.tenant_id.clone(),
            });
        }
        Ok(linked)
    }

    fn tenant_ids(&self) -> CustosResult<HashSet<String>> {
        Ok(self.dataset.tenants.iter().cloned().collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::{MemoryStateInspector, StateInspector};

    const SNAPSHOT: &str = r#"{
        "tenants": ["t1", "t2"],
        "entities": {
            "Sale": {
                "rows": [
                    { "id": "sale-1", "tenant_id": "t1" },
                    { "id": "sale-2", "tenant_id": "t2" }
                ],
                "indexes": [["tenant_id", "created_at"]],
                "unique_constraints": [["tenant_id", "number"]]
            },
            "SaleItem": {
                "rows": [
                    { "id": "item-1", "tenant_id": "t1", "refs": { "Sale": "sale-1" } },
                    { "id": "item-2", "tenant_id": "t2", "refs": { "Sale": "missing" } },
                    { "id": "item-3", "tenant_id": "t2" }
                ]
            }
        }
    }"#;

    /// JSON snapshots load with defaults for omitted sections.
    #[test]
    fn snapshot_parses() {
        let inspector = MemoryStateInspector::from_json_str(SNAPSHOT).unwrap();

        assert_eq!(inspector.rows("Sale").unwrap().len(), 2);
        assert_eq!(inspector.indexes("Sale").unwrap().len(), 1);
        assert!(inspector.indexes("SaleItem").unwrap().is_empty());
        assert!(inspector.rows("Unknown").unwrap().is_empty());
        assert_eq!(inspector.tenant_ids().unwrap().len(), 2);
    }

    /// Linked rows join child refs to existing parents only.
    #[test]
    fn linked_rows_join_existing_parents() {
        let inspector = MemoryStateInspector::from_json_str(SNAPSHOT).unwrap();

        let linked = inspector.linked_rows("Sale", "SaleItem").unwrap();
        assert_eq!(linked.len(), 1, "dangling and ref-less rows are skipped");
        assert_eq!(linked[0].child_id, "item-1");
        assert_eq!(linked[0].parent_id, "sale-1");
        assert_eq!(linked[0].parent_tenant_id.as_deref(), Some("t1"));
    }

    /// Malformed snapshots surface as ConfigError.
    #[test]
    fn malformed_snapshot_is_config_error() {
        let err = MemoryStateInspector::from_json_str("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("configuration error"));
    }
}
