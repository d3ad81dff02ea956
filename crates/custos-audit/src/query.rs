//! Read surface over the audit log for operator tooling.
//!
//! Filtering and pagination happen here at library level; the UI that
//! renders rows is out of scope. Free-text search covers the entity,
//! entity id and the canonical form of the diff payload, so an operator
//! can find "who touched invoice INV-2041" without knowing the shape of
//! the diff in advance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use custos_contracts::{AuditAction, AuditLogEntry, CustosResult};

use crate::{canonical::canonical_json, store::AuditStore};

/// How many diff keys the human-readable summary names before eliding.
const SUMMARY_KEY_LIMIT: usize = 3;

/// Filter and pagination parameters for an audit log query.
///
/// All filters are conjunctive; `None` means "no constraint".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    pub entity: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    pub tenant_id: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
    /// Case-insensitive substring over entity, entity id, and diff.
    pub text: Option<String>,
    /// Zero-based page index.
    pub page: u64,
    pub page_size: u64,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            entity: None,
            action: None,
            actor_id: None,
            tenant_id: None,
            from: None,
            to: None,
            text: None,
            page: 0,
            page_size: 50,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditPage {
    /// Matching entries for the requested page, newest first.
    pub entries: Vec<AuditLogEntry>,

    /// Total matches across all pages.
    pub total: u64,

    pub page: u64,
    pub page_size: u64,
}

/// Run `query` against `store` and return the requested page, newest
/// entries first.
pub fn run_query(store: &dyn AuditStore, query: &AuditQuery) -> CustosResult<AuditPage> {
    let mut matched: Vec<AuditLogEntry> = store
        .load_from(0)?
        .into_iter()
        .filter(|e| matches(e, query))
        .collect();
    matched.reverse();

    let total = matched.len() as u64;
    let start = (query.page * query.page_size).min(total) as usize;
    let end = (start + query.page_size as usize).min(matched.len());

    Ok(AuditPage {
        entries: matched[start..end].to_vec(),
        total,
        page: query.page,
        page_size: query.page_size,
    })
}

fn matches(entry: &AuditLogEntry, query: &AuditQuery) -> bool {
    if let Some(entity) = &query.entity {
        if &entry.entity != entity {
            return false;
        }
    }
    if let Some(action) = &query.action {
        if &entry.action != action {
            return false;
        }
    }
    if let Some(actor_id) = &query.actor_id {
        if entry.actor_id.as_ref() != Some(actor_id) {
            return false;
        }
    }
    if let Some(tenant_id) = &query.tenant_id {
        if entry.tenant_id.as_ref() != Some(tenant_id) {
            return false;
        }
    }
    if let Some(from) = &query.from {
        if entry.created_at < *from {
            return false;
        }
    }
    if let Some(to) = &query.to {
        if entry.created_at >= *to {
            return false;
        }
    }
    if let Some(text) = &query.text {
        let needle = text.to_lowercase();
        let haystack = format!(
            "{} {} {}",
            entry.entity,
            entry.entity_id,
            canonical_json(&entry.diff)
        )
        .to_lowercase();
        if !haystack.contains(&needle) {
            return false;
        }
    }
    true
}

/// A one-line, human-readable description of an entry, derived from the
/// opaque diff payload. Full diffs stay available on the entry itself.
pub fn summarize(entry: &AuditLogEntry) -> String {
    let actor = entry.actor_id.as_deref().unwrap_or("system");
    let mut line = format!(
        "{} {} {} by {}",
        entry.action, entry.entity, entry.entity_id, actor
    );

    if let Some(tenant) = &entry.tenant_id {
        line.push_str(&format!(" (tenant {})", tenant));
    }

    if let serde_json::Value::Object(map) = &entry.diff {
        if !map.is_empty() {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            let named: Vec<&str> = keys.iter().take(SUMMARY_KEY_LIMIT).map(|k| k.as_str()).collect();
            line.push_str(&format!(": changed {}", named.join(", ")));
            if keys.len() > SUMMARY_KEY_LIMIT {
                line.push_str(&format!(" and {} more", keys.len() - SUMMARY_KEY_LIMIT));
            }
        }
    }

    line
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use serde_json::json;

    use custos_contracts::{AuditAction, RequestContext};
    use custos_context::bind;

    use super::{run_query, summarize, AuditQuery};
    use crate::{memory::MemoryAuditStore, writer::AuditLogWriter};

    /// Seed a store with a small mixed workload across two tenants.
    fn seeded_store() -> Arc<MemoryAuditStore> {
        let store = Arc::new(MemoryAuditStore::new());
        let writer = AuditLogWriter::new(store.clone()).unwrap();

        bind(RequestContext::with_request_id("r1").with_tenant("t1").with_actor("alice"), || {
            writer.append("Sale", "sale-1", AuditAction::Create, json!({ "total": 100 })).unwrap();
            writer.append("Sale", "sale-1", AuditAction::Update, json!({ "total": 120 })).unwrap();
            writer.append("Invoice", "INV-2041", AuditAction::Create, json!({ "number": "INV-2041" })).unwrap();
        });
        bind(RequestContext::with_request_id("r2").with_tenant("t2").with_actor("bob"), || {
            writer.append("Sale", "sale-9", AuditAction::Delete, json!({})).unwrap();
        });

        store
    }

    /// Entity + action filters are conjunctive.
    #[test]
    fn filters_by_entity_and_action() {
        let store = seeded_store();
        let page = run_query(
            &*store,
            &AuditQuery {
                entity: Some("Sale".to_string()),
                action: Some(AuditAction::Update),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].entity_id, "sale-1");
    }

    /// Tenant and actor filters match the stamped context fields.
    #[test]
    fn filters_by_tenant_and_actor() {
        let store = seeded_store();
        let page = run_query(
            &*store,
            &AuditQuery {
                tenant_id: Some("t2".to_string()),
                actor_id: Some("bob".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].entity_id, "sale-9");
    }

    /// Free text reaches into the diff payload, case-insensitively.
    #[test]
    fn free_text_searches_diff() {
        let store = seeded_store();
        let page = run_query(
            &*store,
            &AuditQuery {
                text: Some("inv-2041".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].entity, "Invoice");
    }

    /// Date bounds are inclusive-from, exclusive-to.
    #[test]
    fn filters_by_date_range() {
        let store = seeded_store();
        let future = Utc::now() + Duration::hours(1);

        let page = run_query(
            &*store,
            &AuditQuery {
                from: Some(future),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(page.total, 0);

        let page = run_query(
            &*store,
            &AuditQuery {
                to: Some(future),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(page.total, 4);
    }

    /// Pagination slices the newest-first ordering without overlap.
    #[test]
    fn pagination_is_newest_first() {
        let store = seeded_store();

        let first = run_query(
            &*store,
            &AuditQuery {
                page_size: 3,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(first.entries.len(), 3);
        assert_eq!(first.total, 4);
        assert_eq!(first.entries[0].sequence, 3, "newest entry comes first");

        let second = run_query(
            &*store,
            &AuditQuery {
                page: 1,
                page_size: 3,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(second.entries.len(), 1);
        assert_eq!(second.entries[0].sequence, 0);
    }

    /// The summary names the action, entity, actor, tenant, and diff keys.
    #[test]
    fn summary_derives_from_diff() {
        let store = seeded_store();
        let entries = store.export().unwrap();

        let line = summarize(&entries[1]);
        assert_eq!(line, "update Sale sale-1 by alice (tenant t1): changed total");

        let line = summarize(&entries[3]);
        assert_eq!(line, "delete Sale sale-9 by bob (tenant t2)");
    }

    /// Large diffs elide beyond the key limit.
    #[test]
    fn summary_elides_extra_keys() {
        let store = Arc::new(MemoryAuditStore::new());
        let writer = AuditLogWriter::new(store.clone()).unwrap();
        let entry = writer
            .append(
                "Product",
                "p-1",
                AuditAction::Update,
                json!({ "a": 1, "b": 2, "c": 3, "d": 4, "e": 5 }),
            )
            .unwrap();

        let line = summarize(&entry);
        assert_eq!(line, "update Product p-1 by system: changed a, b, c and 2 more");
    }
}
