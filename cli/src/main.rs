//! custos — operator verification CLI
//!
//! Two commands, both read-only:
//!
//!   custos verify-chain --log audit.jsonl [--from 1000]
//!   custos verify-isolation --state snapshot.json [--catalog catalog.toml]
//!
//! Exit code 0 on a full pass, 1 on any failing check (or on an input
//! error). Reports are printed for humans; the same data is available as
//! library types for an operator UI.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use custos_audit::MemoryAuditStore;
use custos_contracts::{AuditLogEntry, ChainReport, CustosError, CustosResult, IsolationReport};
use custos_isolation::{IsolationCatalog, MemoryStateInspector, TenantIsolationAuditor};
use custos_verify::ChainVerifier;

// ── CLI definition ────────────────────────────────────────────────────────────

/// custos — tamper-evident audit and tenant-isolation verification.
#[derive(Parser)]
#[command(
    name = "custos",
    about = "Verify the audit hash chain and tenant isolation invariants",
    long_about = "Replays the audit log to locate tampering, and scans a state\n\
                  snapshot for tenant-isolation violations. Both commands are\n\
                  read-only and exit 1 when any check fails."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay the audit chain and report the first broken entry, if any.
    VerifyChain {
        /// Path to the audit log dump, one JSON entry per line.
        #[arg(long)]
        log: PathBuf,

        /// Resume verification from this sequence instead of genesis.
        #[arg(long, default_value_t = 0)]
        from: u64,
    },
    /// Scan a persisted-state snapshot for tenant-isolation violations.
    VerifyIsolation {
        /// Path to the state snapshot JSON.
        #[arg(long)]
        state: PathBuf,

        /// Optional TOML catalog overriding the compiled-in defaults.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::VerifyChain { log, from } => run_verify_chain(&log, from),
        Command::VerifyIsolation { state, catalog } => {
            run_verify_isolation(&state, catalog.as_deref())
        }
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── verify-chain ──────────────────────────────────────────────────────────────

fn run_verify_chain(log: &Path, from: u64) -> CustosResult<bool> {
    let entries = load_jsonl(log)?;
    let store = MemoryAuditStore::from_entries(entries);
    let report = ChainVerifier::new().verify(&store, from)?;

    print_chain_report(&report, from);
    Ok(report.valid)
}

fn load_jsonl(path: &Path) -> CustosResult<Vec<AuditLogEntry>> {
    let contents = std::fs::read_to_string(path).map_err(|e| CustosError::ConfigError {
        reason: format!("failed to read log file '{}': {}", path.display(), e),
    })?;

    let mut entries = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: AuditLogEntry =
            serde_json::from_str(line).map_err(|e| CustosError::ConfigError {
                reason: format!("invalid entry on line {} of '{}': {}", lineno + 1, path.display(), e),
            })?;
        entries.push(entry);
    }
    Ok(entries)
}

fn print_chain_report(report: &ChainReport, from: u64) {
    println!("Audit chain verification");
    println!("========================");
    if from > 0 {
        println!("resumed from sequence {}", from);
    }
    println!("entries checked:    {}", report.total_checked);
    println!("entries with hash:  {}", report.total_with_hash);

    if report.valid {
        println!();
        println!("PASS — chain intact");
        return;
    }

    if let Some(broken_at) = report.broken_at {
        println!("first break at:     sequence {}", broken_at);
    }
    println!();
    for fault in &report.faults {
        println!("FAULT  seq {:>8}  {}", fault.sequence, fault.message);
    }
    println!();
    println!("FAIL — {} fault(s) detected", report.faults.len());
}

// ── verify-isolation ──────────────────────────────────────────────────────────

fn run_verify_isolation(state: &Path, catalog: Option<&Path>) -> CustosResult<bool> {
    let snapshot = std::fs::read_to_string(state).map_err(|e| CustosError::ConfigError {
        reason: format!("failed to read state snapshot '{}': {}", state.display(), e),
    })?;
    let inspector = MemoryStateInspector::from_json_str(&snapshot)?;

    let auditor = match catalog {
        Some(path) => TenantIsolationAuditor::with_catalog(IsolationCatalog::from_file(path)?),
        None => TenantIsolationAuditor::new(),
    };

    let report = auditor.run_full_check(&inspector)?;
    print_isolation_report(&report);
    Ok(report.passed())
}

/// Section labels, keyed by check-name prefix, in print order.
const SECTIONS: &[(&str, &str)] = &[
    ("orphaned_rows:", "Orphaned rows"),
    ("composite_index:", "Composite indexes (advisory)"),
    ("unique_scoping:", "Unique constraints"),
    ("tenant_match:", "Referential integrity"),
    ("dangling_tenants", "Dangling references"),
];

fn print_isolation_report(report: &IsolationReport) {
    println!("Tenant isolation audit");
    println!("======================");

    for (prefix, label) in SECTIONS {
        let results: Vec<_> = report
            .results
            .iter()
            .filter(|r| r.check.starts_with(prefix))
            .collect();
        if results.is_empty() {
            continue;
        }

        println!();
        println!("{}", label);
        println!("{}", "-".repeat(label.len()));
        for r in results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            println!("  [{}] {:<40} {}", status, r.check, r.message);
            if !r.sample.is_empty() {
                println!("         sample: {}", r.sample.join(", "));
            }
        }
    }

    let (total, passed, failed) = report.counts();
    println!();
    println!("checks: {} total, {} passed, {} failed", total, passed, failed);
    println!("{}", if report.passed() { "PASS" } else { "FAIL" });
}
