//! Record-file ingestion: the boundary to the external scraper.
//!
//! The scraper leaves a JSON array of raw records on disk; this module
//! loads it, runs the core clean pass (validation + fingerprint
//! deduplication), surfaces skip diagnostics as warnings, and prints
//! an ingest summary.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use jobscout_core::dedup::{clean, CleanOutcome};

/// Load the raw record list from a JSON file.
///
/// The payload's shape is not validated here; [`clean`] handles
/// non-array payloads leniently.
pub fn load_records(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse records file: {}", path.display()))
}

/// Load, validate, and deduplicate a record file, printing each
/// skip-and-continue diagnostic on stderr.
pub fn load_and_clean(path: &Path) -> Result<CleanOutcome> {
    let raw = load_records(path)?;
    let outcome = clean(&raw);
    for diagnostic in &outcome.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    Ok(outcome)
}

/// The `jobscout clean` command: report what a clean pass keeps and
/// discards without running any retrieval.
pub fn run_clean(path: &Path) -> Result<()> {
    let raw = load_records(path)?;
    let input_elements = raw.as_array().map_or(0, Vec::len);
    let outcome = clean(&raw);

    for diagnostic in &outcome.diagnostics {
        eprintln!("warning: {diagnostic}");
    }

    println!("clean {}", path.display());
    println!("  input elements: {}", input_elements);
    println!("  kept: {}", outcome.records.len());
    println!("  duplicates discarded: {}", outcome.duplicates_discarded());
    println!("  malformed skipped: {}", outcome.malformed_skipped());
    println!(
        "  missing required fields: {}",
        outcome.missing_field_skipped()
    );
    println!("ok");

    Ok(())
}
