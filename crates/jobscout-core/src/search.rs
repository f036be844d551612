//! Hybrid search: lexical and vector candidate fusion.
//!
//! # Scoring algorithm
//!
//! 1. Fetch up to `top_k` BM25 candidates (positive scores only).
//! 2. Fetch up to `top_k` vector neighbors (squared Euclidean distance,
//!    negated so higher is better).
//! 3. Min-max normalize both candidate lists to `[0, 1]`.
//! 4. Merge the union of positions:
//!    `score = (1 - α) × lexical + α × semantic`.
//! 5. Drop positions outside the corpus; index/corpus desync is a
//!    caller bug, never an error.
//! 6. Sort by score (desc), position (asc). Truncate to `top_k`.
//!
//! Keyword and semantic modes run the same pipeline with α forced to
//! 0 and 1, so single-signal orderings pass through unchanged.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RetrievalError;
use crate::index::VectorIndex;
use crate::lexical::LexicalScorer;
use crate::models::Corpus;
use crate::normalize::tokenize;

/// Which retrieval signals contribute to the final ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Keyword,
    Semantic,
    Hybrid,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyword" => Ok(Self::Keyword),
            "semantic" => Ok(Self::Semantic),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!(
                "unknown search mode: {other}. Use keyword, semantic, or hybrid."
            )),
        }
    }
}

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Maximum results to return; also the candidate fetch depth per
    /// signal.
    pub top_k: usize,
    /// Weight for semantic vs lexical:
    /// `score = (1-α)·lexical + α·semantic`.
    pub hybrid_alpha: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 12,
            hybrid_alpha: 0.6,
        }
    }
}

/// Bundles all inputs for a single search invocation.
///
/// The query vector is pre-computed by the caller (the core never
/// talks to an embedding provider at query time), so keyword-only
/// searches need no provider at all.
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    /// Required for semantic/hybrid modes.
    pub query_vec: Option<&'a [f32]>,
    pub mode: SearchMode,
    pub params: SearchParams,
}

/// A corpus position with its fused score and the per-signal
/// normalized scores that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch {
    pub position: usize,
    pub score: f64,
    pub lexical_score: f64,
    pub semantic_score: f64,
}

/// Run a search against a built corpus, scorer, and index.
///
/// Output is deterministic: score descending, ties broken by
/// ascending corpus position.
///
/// An empty query contributes no lexical candidates, but in
/// semantic/hybrid modes the query vector still retrieves neighbors.
/// Callers needing strict empty-query-means-empty-result semantics
/// must short-circuit before calling.
///
/// # Errors
///
/// - [`RetrievalError::EmptyCorpus`] for an empty corpus.
/// - [`RetrievalError::MissingQueryVector`] when semantic/hybrid mode
///   is requested without `query_vec` or without an index.
pub fn search(
    corpus: &Corpus,
    scorer: &LexicalScorer,
    index: Option<&VectorIndex>,
    request: &SearchRequest<'_>,
) -> Result<Vec<RankedMatch>, RetrievalError> {
    if corpus.is_empty() {
        return Err(RetrievalError::EmptyCorpus);
    }

    let tokens = tokenize(request.query);
    let top_k = request.params.top_k;

    let lexical_candidates = if request.mode == SearchMode::Semantic {
        Vec::new()
    } else {
        scorer.top_k(&tokens, top_k)
    };

    let vector_candidates = if request.mode == SearchMode::Keyword {
        Vec::new()
    } else {
        let (index, query_vec) = match (index, request.query_vec) {
            (Some(index), Some(query_vec)) => (index, query_vec),
            _ => return Err(RetrievalError::MissingQueryVector),
        };
        index
            .query(query_vec, top_k)
            .into_iter()
            // Negate distances so both signals are higher-is-better.
            .map(|(position, distance)| (position, -f64::from(distance)))
            .collect()
    };

    let norm_lexical = normalize_scores(&lexical_candidates);
    let norm_vector = normalize_scores(&vector_candidates);

    let effective_alpha = match request.mode {
        SearchMode::Keyword => 0.0,
        SearchMode::Semantic => 1.0,
        SearchMode::Hybrid => request.params.hybrid_alpha,
    };

    // Union of candidate positions, one entry each.
    let mut signals: HashMap<usize, (f64, f64)> = HashMap::new();
    for &(position, score) in &norm_lexical {
        signals.entry(position).or_insert((0.0, 0.0)).0 = score;
    }
    for &(position, score) in &norm_vector {
        signals.entry(position).or_insert((0.0, 0.0)).1 = score;
    }

    let mut results: Vec<RankedMatch> = signals
        .into_iter()
        .filter(|&(position, _)| position < corpus.len())
        .map(|(position, (lexical, semantic))| RankedMatch {
            position,
            score: (1.0 - effective_alpha) * lexical + effective_alpha * semantic,
            lexical_score: lexical,
            semantic_score: semantic,
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.position.cmp(&b.position))
    });
    results.truncate(top_k);

    Ok(results)
}

/// Min-max normalize raw scores to `[0.0, 1.0]`.
///
/// If all scores are equal, they normalize to `1.0`.
pub fn normalize_scores(candidates: &[(usize, f64)]) -> Vec<(usize, f64)> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let s_min = candidates
        .iter()
        .map(|&(_, s)| s)
        .fold(f64::INFINITY, f64::min);
    let s_max = candidates
        .iter()
        .map(|&(_, s)| s)
        .fold(f64::NEG_INFINITY, f64::max);

    candidates
        .iter()
        .map(|&(position, score)| {
            let norm = if (s_max - s_min).abs() < f64::EPSILON {
                1.0
            } else {
                (score - s_min) / (s_max - s_min)
            };
            (position, norm)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::VocabProvider;
    use crate::embedding::embed_query;
    use crate::models::JobPosting;

    fn corpus(descriptions: &[&str]) -> Corpus {
        Corpus::from_records(
            descriptions
                .iter()
                .enumerate()
                .map(|(i, d)| JobPosting {
                    title: format!("Job {i}"),
                    company: format!("Company {i}"),
                    link: format!("l{i}"),
                    description: Some((*d).to_string()),
                    location: None,
                    applicants: None,
                    skills: Vec::new(),
                })
                .collect(),
        )
    }

    fn keyword_request<'a>(query: &'a str, top_k: usize) -> SearchRequest<'a> {
        SearchRequest {
            query,
            query_vec: None,
            mode: SearchMode::Keyword,
            params: SearchParams {
                top_k,
                ..SearchParams::default()
            },
        }
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_scores(&[]).is_empty());
    }

    #[test]
    fn test_normalize_single() {
        let result = normalize_scores(&[(0, 5.0)]);
        assert_eq!(result.len(), 1);
        assert!((result[0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_range() {
        let result = normalize_scores(&[(0, 10.0), (1, 5.0), (2, 0.0)]);
        assert!((result[0].1 - 1.0).abs() < 1e-9);
        assert!((result[1].1 - 0.5).abs() < 1e-9);
        assert!((result[2].1 - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_all_equal() {
        for (_, score) in normalize_scores(&[(0, 3.0), (1, 3.0)]) {
            assert!((score - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scores_always_in_unit() {
        for (_, score) in normalize_scores(&[(0, -5.0), (1, 100.0), (2, 42.0)]) {
            assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        }
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let corpus = Corpus::default();
        let scorer = LexicalScorer::new(&corpus);
        let err = search(&corpus, &scorer, None, &keyword_request("python", 5)).unwrap_err();
        assert!(matches!(err, RetrievalError::EmptyCorpus));
    }

    #[test]
    fn test_semantic_without_query_vec_is_an_error() {
        let corpus = corpus(&["python developer role"]);
        let scorer = LexicalScorer::new(&corpus);
        let request = SearchRequest {
            query: "python",
            query_vec: None,
            mode: SearchMode::Semantic,
            params: SearchParams::default(),
        };
        let err = search(&corpus, &scorer, None, &request).unwrap_err();
        assert!(matches!(err, RetrievalError::MissingQueryVector));
    }

    #[test]
    fn test_keyword_search_ranks_exact_overlap_first() {
        let corpus = corpus(&["python developer role", "data scientist role ml"]);
        let scorer = LexicalScorer::new(&corpus);
        let results = search(&corpus, &scorer, None, &keyword_request("python developer", 1))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, 0);
    }

    #[test]
    fn test_keyword_search_empty_query_yields_nothing() {
        let corpus = corpus(&["python developer role", "data scientist role ml"]);
        let scorer = LexicalScorer::new(&corpus);
        let results = search(&corpus, &scorer, None, &keyword_request("", 5)).unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_hybrid_search_unions_both_signals() {
        let provider = VocabProvider::new(&["python", "data", "ml"]);
        let corpus = corpus(&["python developer role", "data scientist role ml"]);
        let scorer = LexicalScorer::new(&corpus);
        let index = VectorIndex::build(&provider, &corpus, 64).await.unwrap();
        let query_vec = embed_query(&provider, "python developer").await.unwrap();

        let request = SearchRequest {
            query: "python developer",
            query_vec: Some(&query_vec),
            mode: SearchMode::Hybrid,
            params: SearchParams {
                top_k: 2,
                hybrid_alpha: 0.6,
            },
        };
        let results = search(&corpus, &scorer, Some(&index), &request).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].position, 0, "both signals favor the python posting");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_hybrid_empty_query_still_surfaces_vector_neighbors() {
        let provider = VocabProvider::new(&["python", "data"]);
        let corpus = corpus(&["python developer role", "data scientist role"]);
        let scorer = LexicalScorer::new(&corpus);
        let index = VectorIndex::build(&provider, &corpus, 64).await.unwrap();
        let query_vec = embed_query(&provider, "").await.unwrap();

        let request = SearchRequest {
            query: "",
            query_vec: Some(&query_vec),
            mode: SearchMode::Hybrid,
            params: SearchParams::default(),
        };
        let results = search(&corpus, &scorer, Some(&index), &request).unwrap();
        assert_eq!(results.len(), 2, "vector contribution survives an empty query");
        for result in &results {
            assert_eq!(result.lexical_score, 0.0);
        }
    }

    #[tokio::test]
    async fn test_results_stay_within_corpus_bounds() {
        let provider = VocabProvider::new(&["python"]);
        let full = corpus(&["python a", "python b", "python c"]);
        let scorer = LexicalScorer::new(&full);
        let index = VectorIndex::build(&provider, &full, 64).await.unwrap();
        let query_vec = embed_query(&provider, "python").await.unwrap();

        // Desynced caller: a corpus shorter than the index it passes.
        let truncated = corpus(&["python a", "python b"]);
        let request = SearchRequest {
            query: "python",
            query_vec: Some(&query_vec),
            mode: SearchMode::Hybrid,
            params: SearchParams::default(),
        };
        let results = search(&truncated, &scorer, Some(&index), &request).unwrap();
        for result in &results {
            assert!(result.position < truncated.len(), "out-of-range positions are dropped");
        }
    }

    #[tokio::test]
    async fn test_mode_alpha_extremes_match_single_signals() {
        let provider = VocabProvider::new(&["python", "data", "rust"]);
        let corpus = corpus(&["python python", "data rust python", "rust rust"]);
        let scorer = LexicalScorer::new(&corpus);
        let index = VectorIndex::build(&provider, &corpus, 64).await.unwrap();
        let query_vec = embed_query(&provider, "rust").await.unwrap();

        let semantic = SearchRequest {
            query: "rust",
            query_vec: Some(&query_vec),
            mode: SearchMode::Semantic,
            params: SearchParams::default(),
        };
        let semantic_order: Vec<usize> = search(&corpus, &scorer, Some(&index), &semantic)
            .unwrap()
            .iter()
            .map(|r| r.position)
            .collect();
        let nearest: Vec<usize> = index
            .query(&query_vec, corpus.len())
            .iter()
            .map(|&(p, _)| p)
            .collect();
        assert_eq!(semantic_order, nearest, "semantic mode preserves index ordering");

        let keyword_order: Vec<usize> =
            search(&corpus, &scorer, None, &keyword_request("rust", 12))
                .unwrap()
                .iter()
                .map(|r| r.position)
                .collect();
        let lexical: Vec<usize> = scorer
            .top_k(&tokenize("rust"), 12)
            .iter()
            .map(|&(p, _)| p)
            .collect();
        assert_eq!(keyword_order, lexical, "keyword mode preserves BM25 ordering");
    }
}
