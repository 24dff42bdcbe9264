//! # Check Subcommand
//!
//! Registry linting: enumerate every schema in the registry directory and
//! verify each one parses and compiles as a JSON Schema. Run this after
//! publishing schemas, before the batch that depends on them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use shred_registry::DirRegistry;
use shred_schema::EnvelopeValidator;

/// Arguments for the `shred check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema registry root directory.
    #[arg(long)]
    pub registry: PathBuf,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 if every schema compiles, 1 on any failure,
/// operational errors propagate as `Err`.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let registry = Arc::new(DirRegistry::new(&args.registry));
    let keys = registry
        .schema_keys()
        .context("failed to walk schema registry")?;

    tracing::info!(schema_count = keys.len(), "loaded schema registry");

    let validator = EnvelopeValidator::new(Arc::clone(&registry));
    let mut failures = Vec::new();
    for key in &keys {
        if let Err(e) = validator.precompile(key) {
            failures.push((key, e));
        }
    }

    println!("Schemas: {}/{} compiled", keys.len() - failures.len(), keys.len());
    for (key, error) in &failures {
        println!("  FAIL: {key} — {error}");
    }

    if failures.is_empty() {
        Ok(0)
    } else {
        println!("\n{} schema(s) failed to compile out of {} total.", failures.len(), keys.len());
        Ok(1)
    }
}
