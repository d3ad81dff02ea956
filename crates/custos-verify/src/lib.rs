//! # custos-verify
//!
//! Replays the ordered audit log, recomputing every entry's hash and
//! comparing against the stored chain. Produces a `ChainReport` locating
//! the exact entry where a tamper or corruption occurred.
//!
//! A broken chain is returned as data, never raised as an error — it is an
//! operational finding consumed by the operator CLI and UI.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custos_verify::ChainVerifier;
//!
//! let report = ChainVerifier::new().verify(&store, 0)?;
//! if !report.valid {
//!     println!("chain broken at {:?}", report.broken_at);
//! }
//! ```

pub mod verifier;

pub use verifier::ChainVerifier;
