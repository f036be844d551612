//! The search pipeline command.
//!
//! Ties the full flow together: load + clean the record file, build
//! the lexical scorer and (when the mode needs it) the vector index,
//! embed the query, run the core fusion search, and print ranked
//! postings.

use std::path::Path;

use anyhow::{bail, Result};

use jobscout_core::embedding::embed_query;
use jobscout_core::error::RetrievalError;
use jobscout_core::index::VectorIndex;
use jobscout_core::lexical::LexicalScorer;
use jobscout_core::models::JobPosting;
use jobscout_core::normalize::normalize;
use jobscout_core::search::{search, RankedMatch, SearchMode, SearchParams, SearchRequest};

use crate::config::Config;
use crate::embedding::create_provider;
use crate::ingest::load_and_clean;

pub async fn run_search(
    config: &Config,
    records_path: &Path,
    query: &str,
    mode: &str,
    top_k: Option<usize>,
    max_applicants: Option<i64>,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let parsed_mode: SearchMode = mode.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    // Semantic/hybrid require embeddings
    if parsed_mode != SearchMode::Keyword && !config.embedding.is_enabled() {
        bail!(
            "Mode '{}' requires embeddings. Set [embedding] provider in config.",
            mode
        );
    }
    let mode = parsed_mode;

    let corpus = load_and_clean(records_path)?.into_corpus();
    let scorer = LexicalScorer::new(&corpus);

    let params = SearchParams {
        top_k: top_k.unwrap_or(config.retrieval.top_k),
        hybrid_alpha: config.retrieval.hybrid_alpha,
    };

    // Build the index and embed the query only when the mode needs a
    // vector signal; keyword search works without a provider.
    let (index, query_vec) = if mode == SearchMode::Keyword {
        (None, None)
    } else {
        let provider = create_provider(&config.embedding)?;
        let index =
            VectorIndex::build(provider.as_ref(), &corpus, config.retrieval.batch_size).await?;
        let query_vec = embed_query(provider.as_ref(), &normalize(query))
            .await
            .map_err(RetrievalError::EmbeddingProviderUnavailable)?;
        (Some(index), Some(query_vec))
    };

    let request = SearchRequest {
        query,
        query_vec: query_vec.as_deref(),
        mode,
        params,
    };
    let mut results = search(&corpus, &scorer, index.as_ref(), &request)?;

    // Post-retrieval interestingness filter: keep postings with fewer
    // than N applicants; a missing count means nobody applied yet.
    if let Some(threshold) = max_applicants {
        results.retain(|r| {
            corpus
                .get(r.position)
                .map(|p| p.applicants.unwrap_or(0) < threshold)
                .unwrap_or(false)
        });
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        let Some(posting) = corpus.get(result.position) else {
            continue;
        };
        print_result(i + 1, result, posting);
    }

    Ok(())
}

fn print_result(rank: usize, result: &RankedMatch, posting: &JobPosting) {
    println!(
        "{}. [{:.2}] {} / {}",
        rank, result.score, posting.title, posting.company
    );
    println!("    link: {}", posting.link);
    if let Some(ref location) = posting.location {
        println!("    location: {}", location);
    }
    if let Some(applicants) = posting.applicants {
        println!("    applicants: {}", applicants);
    }
    if !posting.skills.is_empty() {
        println!("    skills: {}", posting.skills.join(", "));
    }
    println!();
}
