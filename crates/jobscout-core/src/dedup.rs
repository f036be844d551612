//! Record validation and fingerprint deduplication.
//!
//! [`clean`] takes the raw JSON record list produced by the external
//! scraper and filters it down to well-formed, first-occurrence-only
//! postings. Defective elements never abort the batch: each skip is
//! reported as a [`Diagnostic`] and processing continues.

use std::collections::HashSet;

use serde_json::Value;

use crate::models::{Corpus, JobPosting};
use crate::normalize::normalize;

/// Normalized (title, company) pair used as the deduplication key.
///
/// Two records with equal fingerprints are the same posting; the first
/// one encountered in input order is retained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub title: String,
    pub company: String,
}

impl Fingerprint {
    pub fn of(record: &JobPosting) -> Self {
        Self {
            title: normalize(&record.title),
            company: normalize(&record.company),
        }
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.title, self.company)
    }
}

/// A non-fatal defect encountered while cleaning a record batch.
///
/// `index` is the element's position in the raw input, not a corpus
/// position.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The input as a whole was not a JSON array; nothing was processed.
    InvalidInputShape,
    /// An element was not a JSON object.
    MalformedElement { index: usize },
    /// A record was missing (or had an empty) required field.
    MissingRequiredField { index: usize, field: &'static str },
    /// A record's fingerprint was already seen earlier in the batch.
    DuplicateDiscarded { index: usize, fingerprint: Fingerprint },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInputShape => {
                write!(f, "input is not a record list; nothing processed")
            }
            Self::MalformedElement { index } => {
                write!(f, "element {index} is not a record object, skipped")
            }
            Self::MissingRequiredField { index, field } => {
                write!(f, "element {index} is missing required field '{field}', skipped")
            }
            Self::DuplicateDiscarded { index, fingerprint } => {
                write!(f, "element {index} duplicates {fingerprint}, discarded")
            }
        }
    }
}

/// Result of cleaning a raw record batch.
#[derive(Debug, Default)]
pub struct CleanOutcome {
    /// Kept records in first-occurrence input order. Fingerprints are
    /// unique across this list.
    pub records: Vec<JobPosting>,
    /// One entry per skipped or discarded element.
    pub diagnostics: Vec<Diagnostic>,
}

impl CleanOutcome {
    pub fn into_corpus(self) -> Corpus {
        Corpus::from_records(self.records)
    }

    pub fn duplicates_discarded(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::DuplicateDiscarded { .. }))
            .count()
    }

    pub fn malformed_skipped(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::MalformedElement { .. }))
            .count()
    }

    pub fn missing_field_skipped(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::MissingRequiredField { .. }))
            .count()
    }
}

/// Validate and deduplicate a raw record list.
///
/// If `input` is not an array the outcome is empty with a single
/// [`Diagnostic::InvalidInputShape`]. This lenient shape matches the
/// scraper boundary, where a bad payload should not crash the pipeline.
///
/// Per element:
/// - non-objects are skipped with [`Diagnostic::MalformedElement`];
/// - records missing `title`, `company`, or `link` (absent, non-string,
///   or empty after trimming) are skipped with
///   [`Diagnostic::MissingRequiredField`];
/// - records whose [`Fingerprint`] was already seen are discarded with
///   [`Diagnostic::DuplicateDiscarded`].
///
/// Kept records preserve their relative input order. The input is
/// never mutated.
pub fn clean(input: &Value) -> CleanOutcome {
    let mut outcome = CleanOutcome::default();

    let Some(elements) = input.as_array() else {
        outcome.diagnostics.push(Diagnostic::InvalidInputShape);
        return outcome;
    };

    let mut seen: HashSet<Fingerprint> = HashSet::new();

    for (index, element) in elements.iter().enumerate() {
        if !element.is_object() {
            outcome
                .diagnostics
                .push(Diagnostic::MalformedElement { index });
            continue;
        }

        let record = match extract_record(element, index, &mut outcome.diagnostics) {
            Some(record) => record,
            None => continue,
        };

        let fingerprint = Fingerprint::of(&record);
        if seen.contains(&fingerprint) {
            outcome
                .diagnostics
                .push(Diagnostic::DuplicateDiscarded { index, fingerprint });
            continue;
        }

        seen.insert(fingerprint);
        outcome.records.push(record);
    }

    outcome
}

/// Pull a typed record out of a JSON object, enforcing the required
/// fields and degrading optional fields to absent on type mismatch.
fn extract_record(
    element: &Value,
    index: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<JobPosting> {
    let mut required = |field: &'static str| -> Option<String> {
        let value = element.get(field).and_then(Value::as_str).unwrap_or("");
        if value.trim().is_empty() {
            diagnostics.push(Diagnostic::MissingRequiredField { index, field });
            None
        } else {
            Some(value.to_string())
        }
    };

    let title = required("title")?;
    let company = required("company")?;
    let link = required("link")?;

    // Optional fields: wrong-typed values degrade to absent rather
    // than rejecting an otherwise valid record.
    let description = element
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    let location = element
        .get("location")
        .and_then(Value::as_str)
        .map(str::to_string);
    let applicants = element.get("applicants").and_then(Value::as_i64);
    let skills = element
        .get("skills")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(JobPosting {
        title,
        company,
        link,
        description,
        location,
        applicants,
        skills,
    })
}
