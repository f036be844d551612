//! Embedding provider trait.
//!
//! Defines the [`EmbeddingProvider`] trait the vector index and search
//! pipeline consume. The core never selects or loads a model; a
//! provider is constructed by the application and passed in, which
//! also makes it trivial to substitute a deterministic test double.
//!
//! Concrete providers (OpenAI, feature-hash, disabled) live in the
//! `jobscout` application crate.

use anyhow::Result;
use async_trait::async_trait;

/// Maps text to a fixed-dimension embedding vector.
///
/// Implementations must be deterministic for identical input text, and
/// [`dims`](EmbeddingProvider::dims) must stay fixed for the lifetime
/// of any corpus indexed with the provider. Every text embeds to
/// *some* vector, the empty string included.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality.
    fn dims(&self) -> usize;

    /// Embed a batch of texts, one vector per input in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embed a single query text.
///
/// Convenience wrapper around [`EmbeddingProvider::embed_batch`] for
/// single-text use cases (e.g. embedding a search query).
pub async fn embed_query(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f32>> {
    let results = provider.embed_batch(&[text.to_string()]).await?;
    results
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("empty embedding response"))
}


#[cfg(test)]
mod tests {
    use super::testing::VocabProvider;
    use super::*;

    #[tokio::test]
    async fn test_embed_query_returns_first_vector() {
        let provider = VocabProvider::new(&["python", "rust"]);
        let vec = embed_query(&provider, "python python rust").await.unwrap();
        assert_eq!(vec, vec![2.0, 1.0]);
    }

    #[tokio::test]
    async fn test_empty_string_still_embeds() {
        let provider = VocabProvider::new(&["python", "rust"]);
        let vec = embed_query(&provider, "").await.unwrap();
        assert_eq!(vec, vec![0.0, 0.0]);
    }
}
