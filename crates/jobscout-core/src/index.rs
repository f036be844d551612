//! Brute-force vector index over corpus embeddings.
//!
//! One embedding per corpus position, computed once at build time from
//! the record's normalized description text and never mutated.
//! Nearest-neighbor queries scan all stored vectors; corpora here are
//! scraped job batches, small enough that an approximate index would
//! be overhead without benefit.

use crate::embedding::EmbeddingProvider;
use crate::error::RetrievalError;
use crate::models::Corpus;
use crate::normalize::normalize;

/// Immutable embedding index addressed by corpus position.
///
/// Read-only after [`build`](VectorIndex::build); safe to query from
/// concurrent readers. Rebuild on corpus change, never update in place.
#[derive(Debug)]
pub struct VectorIndex {
    dims: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Embed every corpus position's normalized description text, in
    /// order, `batch_size` texts per provider call.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::EmptyCorpus`] if the corpus has no records.
    /// - [`RetrievalError::EmbeddingProviderUnavailable`] if the
    ///   provider fails or returns a vector count or dimensionality
    ///   that does not match its contract.
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        corpus: &Corpus,
        batch_size: usize,
    ) -> Result<Self, RetrievalError> {
        if corpus.is_empty() {
            return Err(RetrievalError::EmptyCorpus);
        }

        let texts: Vec<String> = corpus
            .iter()
            .map(|record| normalize(record.description_text()))
            .collect();

        let dims = provider.dims();
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(batch_size.max(1)) {
            let embedded = provider
                .embed_batch(batch)
                .await
                .map_err(RetrievalError::EmbeddingProviderUnavailable)?;

            if embedded.len() != batch.len() {
                return Err(RetrievalError::EmbeddingProviderUnavailable(
                    anyhow::anyhow!(
                        "provider returned {} vectors for {} texts",
                        embedded.len(),
                        batch.len()
                    ),
                ));
            }
            for vector in &embedded {
                if vector.len() != dims {
                    return Err(RetrievalError::EmbeddingProviderUnavailable(
                        anyhow::anyhow!(
                            "provider returned a {}-dim vector, expected {}",
                            vector.len(),
                            dims
                        ),
                    ));
                }
            }
            vectors.extend(embedded);
        }

        Ok(Self { dims, vectors })
    }

    /// Number of indexed vectors (equals the corpus length).
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector dimensionality, fixed at build time.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The `k` positions closest to `vector` by squared Euclidean
    /// distance, ascending; equal distances break by ascending
    /// position so output is reproducible across runs.
    ///
    /// `k` larger than the index returns all stored positions.
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut neighbors: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, stored)| (position, squared_euclidean(vector, stored)))
            .collect();

        neighbors.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        neighbors.truncate(k);
        neighbors
    }
}

/// Squared Euclidean distance: monotonic with true Euclidean, cheaper
/// to compute, and orderings are all any caller observes.
fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}
