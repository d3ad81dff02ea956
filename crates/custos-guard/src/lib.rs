//! # custos-guard
//!
//! Synchronous, observe-only interceptor around every data-access call.
//!
//! The guard answers one question per operation: is a tenant-scoped entity
//! being hit by a multi-row action without a tenant filter while a tenant
//! context is active? When yes, it emits one structured warning — and
//! never blocks, rewrites, or denies the operation. Cross-tenant leakage
//! is caught in logs before it becomes a security incident.
//!
//! ## Usage
//!
//! ```rust
//! use custos_guard::TenantQueryGuard;
//! use custos_contracts::{DataOperation, QueryAction, RequestContext};
//!
//! let guard = TenantQueryGuard::new();
//! let ctx = RequestContext::with_request_id("req-1").with_tenant("t1");
//!
//! custos_context::bind(ctx, || {
//!     let op = DataOperation::new(
//!         "Sale",
//!         QueryAction::FindMany,
//!         serde_json::json!({ "status": "open" }),
//!     );
//!     assert!(guard.inspect(&op).is_some());
//! });
//! ```

pub mod catalog;
pub mod guard;
pub mod predicate;

pub use catalog::GuardCatalog;
pub use guard::TenantQueryGuard;
pub use predicate::{inspect_filter, TenantScoping};
