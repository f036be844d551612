//! # jobscout core
//!
//! Shared retrieval logic for jobscout: record models, text
//! normalization, fingerprint deduplication, BM25 lexical scoring,
//! a brute-force vector index, and the hybrid search algorithm.
//!
//! This crate contains no tokio, filesystem I/O, or network
//! dependencies. Embedding computation is injected through the
//! [`embedding::EmbeddingProvider`] trait; concrete providers live in
//! the `jobscout` application crate.

pub mod dedup;
pub mod embedding;
pub mod error;
pub mod index;
pub mod lexical;
pub mod models;
pub mod normalize;
pub mod search;
