//! Text preprocessing applied before embedding.
//!
//! Normalization must be identical for stored documents and incoming
//! queries, otherwise similarity scores drift between the two sides of
//! every comparison.

use once_cell::sync::Lazy;
use regex::Regex;

use trove_core::truncate_chars;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,!?-]").expect("valid regex"));

/// Normalize text for embedding: trim, collapse runs of whitespace to single
/// spaces, strip characters outside word characters and basic punctuation,
/// and truncate to `max_chars` characters.
pub fn preprocess(text: &str, max_chars: usize) -> String {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    let cleaned = DISALLOWED.replace_all(&collapsed, "");
    truncate_chars(&cleaned, max_chars).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_collapses_whitespace() {
        assert_eq!(preprocess("  hello   world \n next ", 512), "hello world next");
    }

    #[test]
    fn test_strips_disallowed_characters() {
        assert_eq!(
            preprocess("rust & tokio: async/await @ scale!", 512),
            "rust  tokio asyncawait  scale!"
        );
    }

    #[test]
    fn test_keeps_basic_punctuation() {
        assert_eq!(
            preprocess("well, really?! mid-word. ok", 512),
            "well, really?! mid-word. ok"
        );
    }

    #[test]
    fn test_truncates_to_max_chars() {
        let text = "a".repeat(600);
        assert_eq!(preprocess(&text, 512).len(), 512);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let text = "ü".repeat(600);
        assert_eq!(preprocess(&text, 512).chars().count(), 512);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(preprocess("", 512), "");
        assert_eq!(preprocess("   ", 512), "");
    }

    #[test]
    fn test_identical_inputs_normalize_identically() {
        let a = preprocess("Compare  this\ttext", 512);
        let b = preprocess("Compare this text", 512);
        assert_eq!(a, b);
    }
}
