//! Typed errors for the retrieval pipeline.
//!
//! Record-level defects (malformed elements, missing fields,
//! duplicates) are not errors; they are skip-and-continue
//! [`Diagnostic`](crate::dedup::Diagnostic)s on the clean outcome.
//! The variants here abort only the specific call that hits them;
//! no error state is retained between calls.

use thiserror::Error;

/// Corpus-level or provider-level failure during index build or search.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The corpus has zero records; no index can be built and no
    /// retrieval is possible.
    #[error("corpus is empty; nothing to index or search")]
    EmptyCorpus,

    /// The injected embedding provider failed. Retry policy belongs to
    /// the provider itself; this layer never retries.
    #[error("embedding provider unavailable")]
    EmbeddingProviderUnavailable(#[source] anyhow::Error),

    /// A semantic or hybrid request was made without an embedded query
    /// vector (or without a built index). Caller bug.
    #[error("query vector and vector index are required for semantic or hybrid search")]
    MissingQueryVector,
}
