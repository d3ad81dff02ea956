//! The offline isolation auditor.
//!
//! Five invariant classes, each independent and individually reported —
//! one failing check never short-circuits the others, so an operator sees
//! the full extent of the damage in a single run. Overall failure is
//! decided by `IsolationReport::passed()`: only `Critical` findings fail
//! the run, keeping the composite-index class advisory.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use custos_contracts::{
    CustosResult, IsolationReport, Severity, TenantIsolationCheckResult,
};

use crate::{catalog::IsolationCatalog, inspector::StateInspector};

/// Most affected-entity ids carried per result; counts are exact.
const SAMPLE_LIMIT: usize = 5;

/// Scans persisted state for tenant-isolation violations.
///
/// Invoked on demand from operator tooling, never per-request. All access
/// goes through the read-only `StateInspector` seam; the auditor itself
/// holds no connections and blocks no live traffic.
#[derive(Debug, Clone, Default)]
pub struct TenantIsolationAuditor {
    catalog: IsolationCatalog,
}

impl TenantIsolationAuditor {
    /// Build an auditor over the compiled-in default catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an auditor over an explicit catalog.
    pub fn with_catalog(catalog: IsolationCatalog) -> Self {
        Self { catalog }
    }

    /// Run every check and return the combined report.
    pub fn run_full_check(&self, inspector: &dyn StateInspector) -> CustosResult<IsolationReport> {
        let mut results = Vec::new();

        self.check_orphaned_rows(inspector, &mut results)?;
        self.check_composite_indexes(inspector, &mut results)?;
        self.check_unique_scoping(inspector, &mut results)?;
        self.check_referential_consistency(inspector, &mut results)?;
        self.check_dangling_tenants(inspector, &mut results)?;

        let report = IsolationReport { results };
        let (total, passed, failed) = report.counts();
        debug!(total, passed, failed, overall = report.passed(), "isolation audit complete");
        for finding in report.results.iter().filter(|r| !r.passed) {
            warn!(
                check = %finding.check,
                severity = %finding.severity,
                affected = finding.affected_count,
                "isolation check failed"
            );
        }

        Ok(report)
    }

    /// Check 1 — rows with a null/missing tenant id on tenant-scoped
    /// entities. Null-exempt entities report informationally instead of
    /// failing.
    fn check_orphaned_rows(
        &self,
        inspector: &dyn StateInspector,
        results: &mut Vec<TenantIsolationCheckResult>,
    ) -> CustosResult<()> {
        for entity in &self.catalog.tenant_scoped {
            let rows = inspector.rows(entity)?;
            let orphans: Vec<&str> = rows
                .iter()
                .filter(|r| r.tenant_id.is_none())
                .map(|r| r.id.as_str())
                .collect();

            let exempt = self.catalog.null_exempt.contains(entity);
            let (passed, severity, message) = if orphans.is_empty() {
                (true, Severity::Critical, format!("all {} rows carry a tenant id", entity))
            } else if exempt {
                (
                    true,
                    Severity::Info,
                    format!(
                        "{} {} rows have a null tenant id (intentionally allowed)",
                        orphans.len(),
                        entity
                    ),
                )
            } else {
                (
                    false,
                    Severity::Critical,
                    format!("{} {} rows have a null tenant id", orphans.len(), entity),
                )
            };

            results.push(TenantIsolationCheckResult {
                check: format!("orphaned_rows:{}", entity),
                passed,
                severity,
                message,
                affected_count: orphans.len() as u64,
                sample: sample(&orphans),
            });
        }
        Ok(())
    }

    /// Check 2 — high-traffic entities should have at least one
    /// multi-column index that includes the tenant id. Advisory only.
    fn check_composite_indexes(
        &self,
        inspector: &dyn StateInspector,
        results: &mut Vec<TenantIsolationCheckResult>,
    ) -> CustosResult<()> {
        for entity in &self.catalog.high_traffic {
            let indexes = inspector.indexes(entity)?;
            let covered = indexes
                .iter()
                .any(|cols| cols.len() >= 2 && cols.iter().any(|c| c == &self.catalog.tenant_field));

            results.push(TenantIsolationCheckResult {
                check: format!("composite_index:{}", entity),
                passed: covered,
                severity: Severity::Warning,
                message: if covered {
                    format!("{} has a composite index covering the tenant id", entity)
                } else {
                    format!(
                        "{} has no composite index including '{}'; tenant-filtered queries will scan",
                        entity, self.catalog.tenant_field
                    )
                },
                affected_count: u64::from(!covered),
                sample: Vec::new(),
            });
        }
        Ok(())
    }

    /// Check 3 — entities declaring unique constraints must scope at
    /// least one of them by tenant id, or two tenants can collide on a
    /// value meant to be tenant-unique.
    fn check_unique_scoping(
        &self,
        inspector: &dyn StateInspector,
        results: &mut Vec<TenantIsolationCheckResult>,
    ) -> CustosResult<()> {
        for entity in &self.catalog.tenant_scoped {
            let constraints = inspector.unique_constraints(entity)?;
            if constraints.is_empty() {
                // Nothing declared tenant-unique; nothing to scope.
                continue;
            }

            let scoped = constraints
                .iter()
                .any(|cols| cols.iter().any(|c| c == &self.catalog.tenant_field));

            results.push(TenantIsolationCheckResult {
                check: format!("unique_scoping:{}", entity),
                passed: scoped,
                severity: Severity::Critical,
                message: if scoped {
                    format!("{} has a tenant-scoped unique constraint", entity)
                } else {
                    format!(
                        "no unique constraint on {} includes '{}'; values collide across tenants",
                        entity, self.catalog.tenant_field
                    )
                },
                affected_count: if scoped { 0 } else { constraints.len() as u64 },
                sample: Vec::new(),
            });
        }
        Ok(())
    }

    /// Check 4 — declared parent→child pairs must agree on tenancy, and a
    /// child carrying a tenant id must not hang off a tenantless parent.
    fn check_referential_consistency(
        &self,
        inspector: &dyn StateInspector,
        results: &mut Vec<TenantIsolationCheckResult>,
    ) -> CustosResult<()> {
        for rel in &self.catalog.relationships {
            let linked = inspector.linked_rows(&rel.parent, &rel.child)?;
            let violations: Vec<&str> = linked
                .iter()
                .filter(|l| match (&l.child_tenant_id, &l.parent_tenant_id) {
                    (Some(child), Some(parent)) => child != parent,
                    (Some(_), None) => true,
                    _ => false,
                })
                .map(|l| l.child_id.as_str())
                .collect();

            results.push(TenantIsolationCheckResult {
                check: format!("tenant_match:{}->{}", rel.parent, rel.child),
                passed: violations.is_empty(),
                severity: Severity::Critical,
                message: if violations.is_empty() {
                    format!("{} and {} agree on tenancy", rel.parent, rel.child)
                } else {
                    format!(
                        "{} {} rows disagree with their {} parent on tenant id",
                        violations.len(),
                        rel.child,
                        rel.parent
                    )
                },
                affected_count: violations.len() as u64,
                sample: sample(&violations),
            });
        }
        Ok(())
    }

    /// Check 5 — every tenant id referenced by a tenant-scoped row must
    /// exist in the tenant registry.
    fn check_dangling_tenants(
        &self,
        inspector: &dyn StateInspector,
        results: &mut Vec<TenantIsolationCheckResult>,
    ) -> CustosResult<()> {
        let known = inspector.tenant_ids()?;

        let mut dangling_ids: BTreeSet<String> = BTreeSet::new();
        let mut affected_rows: u64 = 0;
        let mut samples: Vec<String> = Vec::new();

        for entity in &self.catalog.tenant_scoped {
            for row in inspector.rows(entity)? {
                let Some(tenant_id) = row.tenant_id else {
                    continue;
                };
                if !known.contains(&tenant_id) {
                    affected_rows += 1;
                    dangling_ids.insert(tenant_id);
                    if samples.len() < SAMPLE_LIMIT {
                        samples.push(format!("{}:{}", entity, row.id));
                    }
                }
            }
        }

        let passed = dangling_ids.is_empty();
        results.push(TenantIsolationCheckResult {
            check: "dangling_tenants".to_string(),
            passed,
            severity: Severity::Critical,
            message: if passed {
                "every referenced tenant id exists".to_string()
            } else {
                format!(
                    "{} rows reference nonexistent tenants: {}",
                    affected_rows,
                    dangling_ids.iter().cloned().collect::<Vec<_>>().join(", ")
                )
            },
            affected_count: affected_rows,
            sample: samples,
        });
        Ok(())
    }
}

fn sample(ids: &[&str]) -> Vec<String> {
    ids.iter().take(SAMPLE_LIMIT).map(|s| s.to_string()).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
