//! The generic data-access operation consumed by the tenant query guard.
//!
//! The business domain's repository layer describes each call it is about
//! to make as a `DataOperation` — entity type, action, and the filter
//! predicate as loosely structured JSON — and hands it to the guard. The
//! audit core never executes these operations itself.

use serde::{Deserialize, Serialize};

/// The shape of a data-access call, from the guard's point of view.
///
/// Single-row-by-key lookups cannot leak across tenants by themselves;
/// only the multi-row variants are in the guard's risk catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryAction {
    FindUnique,
    FindFirst,
    FindMany,
    Create,
    Update,
    UpdateMany,
    Delete,
    DeleteMany,
    Aggregate,
    Count,
    GroupBy,
}

impl QueryAction {
    /// Stable string form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryAction::FindUnique => "find_unique",
            QueryAction::FindFirst => "find_first",
            QueryAction::FindMany => "find_many",
            QueryAction::Create => "create",
            QueryAction::Update => "update",
            QueryAction::UpdateMany => "update_many",
            QueryAction::Delete => "delete",
            QueryAction::DeleteMany => "delete_many",
            QueryAction::Aggregate => "aggregate",
            QueryAction::Count => "count",
            QueryAction::GroupBy => "group_by",
        }
    }
}

impl std::fmt::Display for QueryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One data-access call as presented to the tenant query guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataOperation {
    /// The entity type the call targets, e.g. `"Sale"`.
    pub entity: String,

    /// What kind of call this is.
    pub action: QueryAction,

    /// The filter predicate, as the repository layer's JSON representation
    /// of its `where` clause. `Null` means "no filter".
    pub filter: serde_json::Value,
}

impl DataOperation {
    pub fn new(entity: impl Into<String>, action: QueryAction, filter: serde_json::Value) -> Self {
        Self {
            entity: entity.into(),
            action,
            filter,
        }
    }
}
