//! # Run Subcommand
//!
//! Batch shredding: read canonical events from a JSONL file, shred each
//! against the registry, and route the results. Every event is handled
//! independently: a failed event lands in the bad sink with its complete
//! error list and never contributes documents, while the other events in
//! the batch proceed untouched.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use shred_core::ShredError;
use shred_engine::{CanonicalEvent, Shredder};
use shred_registry::{CachingRegistry, DirRegistry};

/// Arguments for the `shred run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input file of canonical events, one JSON record per line.
    #[arg(long)]
    pub input: PathBuf,

    /// Schema registry root directory.
    #[arg(long)]
    pub registry: PathBuf,

    /// Output directory; one JSONL file per schema table.
    #[arg(long)]
    pub output: PathBuf,

    /// Failed-events sink file.
    #[arg(long)]
    pub bad: PathBuf,
}

/// Execute the run subcommand.
///
/// Returns exit code: 0 if every event shredded, 1 if any event failed,
/// operational errors propagate as `Err`.
pub fn run_shred(args: &RunArgs) -> Result<u8> {
    let registry = Arc::new(CachingRegistry::new(DirRegistry::new(&args.registry)));
    let shredder = Shredder::new(registry);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create output directory {}", args.output.display()))?;
    let input = File::open(&args.input)
        .with_context(|| format!("failed to open input {}", args.input.display()))?;
    let mut bad = BufWriter::new(File::create(&args.bad).with_context(|| {
        format!("failed to create failed-events sink {}", args.bad.display())
    })?);

    let mut tables: HashMap<String, BufWriter<File>> = HashMap::new();
    let mut events = 0usize;
    let mut documents = 0usize;
    let mut failed = 0usize;

    for (index, line) in BufReader::new(input).lines().enumerate() {
        let line = line.with_context(|| format!("failed reading {}", args.input.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        events += 1;
        let line_number = index + 1;

        let event: CanonicalEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                failed += 1;
                let errors = vec![ShredError::new("event", format!("not a canonical event: {e}"))];
                write_bad_row(&mut bad, line_number, &line, &errors)?;
                continue;
            }
        };

        match shredder.shred(&event).into_result() {
            Ok(docs) => {
                for doc in &docs {
                    let table = doc.schema.table_name();
                    let writer = match tables.entry(table) {
                        Entry::Occupied(entry) => entry.into_mut(),
                        Entry::Vacant(entry) => {
                            let path = args.output.join(format!("{}.jsonl", entry.key()));
                            let file = File::create(&path).with_context(|| {
                                format!("failed to create table file {}", path.display())
                            })?;
                            entry.insert(BufWriter::new(file))
                        }
                    };
                    let row = doc.to_canonical_row().with_context(|| {
                        format!("failed to project document for {}", doc.schema)
                    })?;
                    writeln!(writer, "{row}")?;
                }
                documents += docs.len();
                tracing::debug!(
                    root_id = %event.root_id,
                    documents = docs.len(),
                    "event shredded"
                );
            }
            Err(errors) => {
                failed += 1;
                tracing::debug!(
                    root_id = %event.root_id,
                    errors = errors.len(),
                    "event failed to shred"
                );
                write_bad_row(&mut bad, line_number, &line, &errors)?;
            }
        }
    }

    for writer in tables.values_mut() {
        writer.flush()?;
    }
    bad.flush()?;

    tracing::info!(events, documents, failed, tables = tables.len(), "run complete");
    println!(
        "Events: {}/{} shredded, {} documents across {} tables, {} failed",
        events - failed,
        events,
        documents,
        tables.len(),
        failed
    );

    Ok(if failed > 0 { 1 } else { 0 })
}

/// Append one failed event to the bad sink, preserving the raw input line
/// and the full error list for triage.
fn write_bad_row(
    bad: &mut impl Write,
    line_number: usize,
    raw: &str,
    errors: &[ShredError],
) -> Result<()> {
    let record = serde_json::json!({
        "line": line_number,
        "errors": errors,
        "payload": raw,
    });
    writeln!(bad, "{record}").context("failed writing to failed-events sink")?;
    Ok(())
}
