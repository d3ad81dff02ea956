//! Error types for the custos audit core.
//!
//! Only durability-affecting failures are errors here. Findings about
//! historical state — a broken chain, an isolation violation, a guard
//! warning — are report data, never error variants: an operator consumes
//! them from `ChainReport` / `IsolationReport`, and business code never
//! sees them at all.

use thiserror::Error;

/// The unified error type for the custos crates.
#[derive(Debug, Error)]
pub enum CustosError {
    /// An audit entry could not be durably persisted with its final hash.
    ///
    /// Surfaced synchronously to the caller that triggered the audited
    /// action. Whether the triggering business operation rolls back is the
    /// caller's policy; the core only guarantees it never reports success
    /// for an entry it failed to persist.
    #[error("audit write failed: {reason}")]
    WriteFailed { reason: String },

    /// The audit store could not serve a read or append.
    #[error("audit store error: {reason}")]
    StoreError { reason: String },

    /// A catalog or configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the custos crates.
pub type CustosResult<T> = Result<T, CustosError>;
