//! BM25 lexical scorer over corpus description text.
//!
//! Builds an inverted index keyed by corpus position at construction
//! time; scoring is then a pure lookup. Okapi BM25 with the standard
//! `k1 = 1.2`, `b = 0.75` parameters and the +1 idf variant, so scores
//! for matching terms are always positive.

use std::collections::HashMap;

use crate::models::Corpus;
use crate::normalize::tokenize;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Document-frequency-aware, length-normalized lexical scorer.
///
/// Read-only after construction; safe to share across concurrent
/// readers.
pub struct LexicalScorer {
    /// term -> (position, term frequency) postings.
    postings: HashMap<String, Vec<(usize, u32)>>,
    doc_lengths: Vec<u32>,
    avg_doc_len: f64,
}

impl LexicalScorer {
    /// Tokenize every corpus position's description text and build the
    /// inverted index.
    pub fn new(corpus: &Corpus) -> Self {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(corpus.len());

        for (position, record) in corpus.iter().enumerate() {
            let tokens = tokenize(record.description_text());
            doc_lengths.push(tokens.len() as u32);

            let mut term_freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *term_freqs.entry(token).or_insert(0) += 1;
            }
            for (term, freq) in term_freqs {
                postings.entry(term).or_default().push((position, freq));
            }
        }

        let total_len: u64 = doc_lengths.iter().map(|&l| u64::from(l)).sum();
        let avg_doc_len = if doc_lengths.is_empty() {
            0.0
        } else {
            total_len as f64 / doc_lengths.len() as f64
        };

        Self {
            postings,
            doc_lengths,
            avg_doc_len,
        }
    }

    /// BM25 score for every corpus position against the query tokens.
    ///
    /// Positions with no matching term score 0.0; an empty token list
    /// scores every position 0.0 (it never matches everything).
    pub fn score_all(&self, query_tokens: &[String]) -> Vec<(usize, f64)> {
        let mut scores = vec![0.0f64; self.doc_lengths.len()];
        let n = self.doc_lengths.len() as f64;

        for term in query_tokens {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };
            let df = postings.len() as f64;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for &(position, tf) in postings {
                let doc_len = f64::from(self.doc_lengths[position]);
                let tf = f64::from(tf);
                let denom = tf + K1 * (1.0 - B + B * doc_len / self.avg_doc_len);
                scores[position] += idf * (tf * (K1 + 1.0)) / denom;
            }
        }

        scores.into_iter().enumerate().collect()
    }

    /// The `k` positions with the highest strictly-positive scores,
    /// score descending, ties broken by ascending position.
    ///
    /// Zero-score positions never appear, so an empty query yields an
    /// empty result.
    pub fn top_k(&self, query_tokens: &[String], k: usize) -> Vec<(usize, f64)> {
        let mut scored: Vec<(usize, f64)> = self
            .score_all(query_tokens)
            .into_iter()
            .filter(|&(_, score)| score > 0.0)
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored
    }
}
