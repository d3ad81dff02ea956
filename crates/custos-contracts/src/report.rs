//! Report types produced by the chain verifier, the tenant query guard,
//! and the tenant isolation auditor.
//!
//! Broken chains and isolation violations are operational findings, not
//! program errors — they only ever travel as the data in this module.

use serde::{Deserialize, Serialize};

// ── Chain verification ────────────────────────────────────────────────────────

/// One detected mismatch in the hash chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFault {
    /// Sequence of the entry where the mismatch was detected.
    pub sequence: u64,

    /// Human-readable description of what failed to match.
    pub message: String,
}

/// The outcome of replaying the audit chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReport {
    /// True iff zero faults were found across the scanned range.
    pub valid: bool,

    /// Entries examined, including legacy rows without a hash.
    pub total_checked: u64,

    /// Entries that carried a hash and were actually verified.
    pub total_with_hash: u64,

    /// Sequence of the first broken entry, if any. Later faults are in
    /// `faults` but do not move this value.
    pub broken_at: Option<u64>,

    /// Every detected mismatch, in scan order.
    pub faults: Vec<ChainFault>,
}

impl ChainReport {
    /// An empty, valid report — the result of scanning zero entries.
    pub fn empty() -> Self {
        Self {
            valid: true,
            total_checked: 0,
            total_with_hash: 0,
            broken_at: None,
            faults: Vec::new(),
        }
    }
}

// ── Guard warnings ────────────────────────────────────────────────────────────

/// An observational finding from the tenant query guard: a tenant-scoped
/// entity was accessed by a risky action without a tenant filter while a
/// tenant context was active.
///
/// Warnings never block the underlying operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardWarning {
    /// The entity type that was accessed without tenant scoping.
    pub entity: String,

    /// The risky action, in its stable string form.
    pub action: String,

    /// The ambient tenant that should have been filtered on.
    pub tenant_id: String,

    /// The request the access happened under, when known.
    pub request_id: Option<String>,
}

// ── Tenant isolation ──────────────────────────────────────────────────────────

/// How serious a failing isolation check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A correctness risk — fails the overall report.
    Critical,
    /// A performance or hygiene risk — advisory only.
    Warning,
    /// Informational; never fails anything.
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// The outcome of one isolation check against one entity type or
/// relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantIsolationCheckResult {
    /// Stable check identifier, e.g. `"orphaned_rows:Sale"`.
    pub check: String,

    pub passed: bool,

    pub severity: Severity,

    /// Actionable description of what was found.
    pub message: String,

    /// How many rows/constraints the finding covers.
    pub affected_count: u64,

    /// A capped sample of affected entity identifiers.
    pub sample: Vec<String>,
}

/// The full isolation audit outcome: every check, individually reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsolationReport {
    pub results: Vec<TenantIsolationCheckResult>,
}

impl IsolationReport {
    /// Overall pass/fail. Advisory results (severity below `Critical`)
    /// never fail the report, matching the composite-index check's
    /// performance-risk-only status.
    pub fn passed(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.passed || r.severity != Severity::Critical)
    }

    /// (total, passed, failed) counts over all results.
    pub fn counts(&self) -> (usize, usize, usize) {
        let total = self.results.len();
        let passed = self.results.iter().filter(|r| r.passed).count();
        (total, passed, total - passed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn result(passed: bool, severity: Severity) -> TenantIsolationCheckResult {
        TenantIsolationCheckResult {
            check: "orphaned_rows:Sale".to_string(),
            passed,
            severity,
            message: "test".to_string(),
            affected_count: if passed { 0 } else { 1 },
            sample: Vec::new(),
        }
    }

    /// A failing critical check fails the whole report.
    #[test]
    fn critical_failure_fails_report() {
        let report = IsolationReport {
            results: vec![result(true, Severity::Critical), result(false, Severity::Critical)],
        };
        assert!(!report.passed());
        assert_eq!(report.counts(), (2, 1, 1));
    }

    /// A failing advisory check does not fail the overall report.
    #[test]
    fn advisory_failure_is_not_fatal() {
        let report = IsolationReport {
            results: vec![result(true, Severity::Critical), result(false, Severity::Warning)],
        };
        assert!(report.passed());
        assert_eq!(report.counts(), (2, 1, 1));
    }

    /// An empty chain report is valid with zeroed counters.
    #[test]
    fn empty_chain_report_is_valid() {
        let report = ChainReport::empty();
        assert!(report.valid);
        assert_eq!(report.total_checked, 0);
        assert!(report.broken_at.is_none());
    }
}
