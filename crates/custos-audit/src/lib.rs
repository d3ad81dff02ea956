//! # custos-audit
//!
//! Immutable, append-only, SHA-256 hash-chained audit log.
//!
//! ## Overview
//!
//! Every state-changing operation in the hosting application records an
//! `AuditLogEntry` through `AuditLogWriter`. Each entry links to the
//! previous one via its SHA-256 hash, so tampering with any stored field —
//! even a single byte of the diff payload — breaks the chain and is
//! detected by the verifier in `custos-verify`.
//!
//! Actor, tenant, and request metadata are stamped from the ambient
//! context bound via `custos-context`; the business code never threads
//! them through its signatures.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use custos_audit::{AuditLogWriter, MemoryAuditStore};
//! use custos_contracts::{AuditAction, RequestContext};
//!
//! let store = Arc::new(MemoryAuditStore::new());
//! let writer = AuditLogWriter::new(store.clone()).unwrap();
//!
//! let ctx = RequestContext::with_request_id("req-1").with_tenant("t1");
//! let entry = custos_context::bind(ctx, || {
//!     writer.append(
//!         "Sale",
//!         "sale-1",
//!         AuditAction::Create,
//!         serde_json::json!({ "total": 100 }),
//!     )
//! }).unwrap();
//!
//! assert_eq!(entry.tenant_id.as_deref(), Some("t1"));
//! ```

pub mod canonical;
pub mod chain;
pub mod memory;
pub mod query;
pub mod store;
pub mod writer;

pub use canonical::canonical_json;
pub use chain::{canonical_entry_bytes, hash_entry, verify_links};
pub use memory::MemoryAuditStore;
pub use query::{run_query, summarize, AuditPage, AuditQuery};
pub use store::AuditStore;
pub use writer::AuditLogWriter;
