//! # custos-contracts
//!
//! Shared types, reports, and error contracts for the custos audit core.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, small constructors, and error types.

pub mod context;
pub mod entry;
pub mod error;
pub mod operation;
pub mod report;

pub use context::RequestContext;
pub use entry::{AuditAction, AuditLogEntry};
pub use error::{CustosError, CustosResult};
pub use operation::{DataOperation, QueryAction};
pub use report::{
    ChainFault, ChainReport, GuardWarning, IsolationReport, Severity, TenantIsolationCheckResult,
};
