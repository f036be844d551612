//! Core data models used throughout jobscout.
//!
//! These types represent the job postings that flow through the
//! deduplication and retrieval pipeline.

use serde::{Deserialize, Serialize};

/// A scraped job posting after validation.
///
/// `title`, `company`, and `link` are always present and non-empty;
/// records missing any of them are rejected during [`clean`](crate::dedup::clean).
/// The remaining fields are optional and extracted leniently from the
/// raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicants: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

impl JobPosting {
    /// Description text used for lexical scoring and embedding.
    ///
    /// Records without a description index as the empty string.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// The ordered, deduplicated record set used as the unit of indexing
/// and retrieval.
///
/// Each posting is addressed by its stable 0-based position, which is
/// the join key between the lexical scorer's document order and the
/// vector index's vector order. A corpus is immutable once built;
/// rebuild on change, never update in place.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<JobPosting>,
}

impl Corpus {
    /// Build a corpus from already-cleaned records, preserving order.
    pub fn from_records(records: Vec<JobPosting>) -> Self {
        Self { records }
    }

    /// The posting at `position`, or `None` if out of range.
    pub fn get(&self, position: usize) -> Option<&JobPosting> {
        self.records.get(position)
    }

    /// All postings in corpus order.
    pub fn records(&self) -> &[JobPosting] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobPosting> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
