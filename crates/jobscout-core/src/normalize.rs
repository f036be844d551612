//! Text canonicalization used for fingerprinting and tokenization.
//!
//! All free text entering the pipeline (titles, companies, and
//! description text) passes through [`normalize`] before it is
//! compared, indexed, or embedded, so case and whitespace variants of
//! the same posting collapse to a single form.

/// Canonicalize free text: lower-case, trim, and collapse every run of
/// whitespace to a single space.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace-split tokens of the normalized text.
///
/// An empty or all-whitespace input yields no tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize("  Software   Engineer  "), "software engineer");
        assert_eq!(normalize("DATA SCIENTIST"), "data scientist");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("  A  b ");
        assert_eq!(normalize(&once), once);
        assert_eq!(normalize("  A  b "), normalize("a b"));
    }

    #[test]
    fn test_tokenize_splits_normalized_text() {
        assert_eq!(tokenize("  Python   Developer "), vec!["python", "developer"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }
}
