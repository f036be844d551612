//! # jobscout
//!
//! Application crate for jobscout: configuration loading, concrete
//! embedding providers, record-file ingestion, and the search
//! pipeline behind the `jobscout` CLI.
//!
//! The retrieval logic itself (deduplication, BM25, vector index,
//! hybrid fusion) lives in `jobscout-core`; this crate wires it to
//! TOML config, the filesystem, and the embedding backends.

pub mod config;
pub mod embedding;
pub mod ingest;
pub mod search;
