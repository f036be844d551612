//! # jobscout CLI
//!
//! The `jobscout` binary ingests a scraped job-posting record file,
//! deduplicates it, and retrieves the postings most relevant to a
//! free-text query by fusing BM25 lexical scoring with embedding
//! nearest-neighbor search.
//!
//! ## Usage
//!
//! ```bash
//! jobscout --config ./config/jobscout.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `jobscout clean` | Validate and deduplicate the record file, report counts |
//! | `jobscout search "<query>"` | Search the deduplicated postings |
//!
//! ## Examples
//!
//! ```bash
//! # Report what deduplication keeps and discards
//! jobscout clean --config ./config/jobscout.toml
//!
//! # Keyword (BM25) search
//! jobscout search "rust backend engineer"
//!
//! # Hybrid search (keyword + semantic), smaller result set
//! jobscout search "remote python jobs" --mode hybrid --top-k 5
//!
//! # Only postings with fewer than 10 applicants
//! jobscout search "data scientist" --max-applicants 10
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use jobscout::config::load_config;
use jobscout::ingest::run_clean;
use jobscout::search::run_search;

/// jobscout: deduplicating hybrid search over scraped job postings.
#[derive(Parser)]
#[command(
    name = "jobscout",
    about = "Deduplicating hybrid (BM25 + embedding) search over scraped job postings",
    version,
    long_about = "jobscout takes the JSON record file an external scraper produced, filters it \
    to well-formed first-occurrence postings by a normalized (title, company) fingerprint, and \
    retrieves the subset most relevant to a query by fusing a BM25 lexical score with an \
    embedding nearest-neighbor search."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/jobscout.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Validate and deduplicate the record file, reporting counts.
    ///
    /// Skipped elements (malformed, missing required fields) and
    /// discarded duplicates are listed as warnings on stderr; nothing
    /// is written anywhere.
    Clean {
        /// Records file to clean (defaults to `records.path` from config).
        #[arg(long)]
        records: Option<PathBuf>,
    },

    /// Search the deduplicated postings.
    ///
    /// The record file is cleaned and indexed in memory for each
    /// invocation; nothing persists between runs.
    Search {
        /// Search query text.
        query: String,

        /// Search mode: keyword, semantic, or hybrid.
        #[arg(long, default_value = "keyword")]
        mode: String,

        /// Maximum results (defaults to `retrieval.top_k` from config).
        #[arg(long)]
        top_k: Option<usize>,

        /// Only show postings with fewer than this many applicants.
        #[arg(long)]
        max_applicants: Option<i64>,

        /// Records file to search (defaults to `records.path` from config).
        #[arg(long)]
        records: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Clean { records } => {
            let path = records.unwrap_or_else(|| config.records.path.clone());
            run_clean(&path)
        }
        Commands::Search {
            query,
            mode,
            top_k,
            max_applicants,
            records,
        } => {
            let path = records.unwrap_or_else(|| config.records.path.clone());
            run_search(&config, &path, &query, &mode, top_k, max_applicants).await
        }
    }
}
