//! # custos-isolation
//!
//! Offline tenant-isolation auditor.
//!
//! Scans persisted state — through the read-only `StateInspector` seam —
//! for four invariant classes plus the tenant registry: orphaned rows,
//! missing composite indexes, unscoped unique constraints, cross-entity
//! tenant mismatches, and dangling tenant references. Each check reports
//! independently; the composite-index class is advisory, everything else
//! fails the run.
//!
//! Detection only: the auditor reports, it never remediates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custos_isolation::{MemoryStateInspector, TenantIsolationAuditor};
//!
//! let inspector = MemoryStateInspector::from_json_str(&snapshot)?;
//! let report = TenantIsolationAuditor::new().run_full_check(&inspector)?;
//! for result in &report.results {
//!     println!("[{}] {}", if result.passed { "PASS" } else { "FAIL" }, result.message);
//! }
//! ```

pub mod auditor;
pub mod catalog;
pub mod inspector;

pub use auditor::TenantIsolationAuditor;
pub use catalog::{IsolationCatalog, Relationship};
pub use inspector::{Dataset, EntityRow, EntityState, LinkedRow, MemoryStateInspector, StateInspector};
