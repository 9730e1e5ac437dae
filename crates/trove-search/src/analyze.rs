//! Lexical query analysis: intent, content-type hint, keywords, expansions.
//!
//! Everything here is a pure function of the query string plus two fixed
//! tables (stop words and synonyms). No persisted state, no I/O: the analyzer
//! runs on every search request before any embedding work starts, so it has
//! to be cheap and deterministic.

use once_cell::sync::Lazy;
use regex::Regex;

use trove_core::defaults::{EMBED_MAX_INPUT_CHARS, KEYWORD_LIMIT, KEYWORD_MIN_CHARS};
use trove_core::{truncate_chars, QueryAnalysis, QueryIntent, QueryType};

static QUESTION_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(what|who|where|when|why|how)\b").expect("valid regex"));
static SEARCH_VERBS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(find|search|show|get|list)\b").expect("valid regex"));
static COMPARISON_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(compare|versus|vs|difference)\b").expect("valid regex"));
static SUMMARY_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(summarize|summary|tldr)\b").expect("valid regex"));

static IMAGE_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(image|photo|picture|screenshot)\b").expect("valid regex"));
static ARTICLE_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(article|blog|post|news)\b").expect("valid regex"));
static VIDEO_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(video|youtube|watch)\b").expect("valid regex"));
static PRODUCT_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(product|buy|purchase|price)\b").expect("valid regex"));

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid regex"));

// Must stay in sync with the embedder's normalization so the reported
// processed form matches what actually gets embedded.
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?-]").expect("valid regex"));

/// Tokens too common to carry signal as keywords.
const STOP_WORDS: [&str; 14] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Fixed synonym table for query expansion. Expansions broaden recall for
/// recommendation generation; the primary vector search never uses them.
const SYNONYMS: [(&str, &[&str]); 5] = [
    ("car", &["vehicle", "automobile", "auto"]),
    ("image", &["picture", "photo", "screenshot"]),
    ("article", &["post", "blog", "news", "story"]),
    ("video", &["clip", "movie", "film"]),
    ("ai", &["artificial intelligence", "machine learning", "ml"]),
];

/// Full analyzer output: the wire-shaped analysis plus the query forms it
/// was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedQuery {
    pub original_query: String,
    /// The query after embedding-style normalization; informational only.
    pub processed_query: String,
    pub analysis: QueryAnalysis,
}

/// Analyze a raw query string.
pub fn analyze(query: &str) -> AnalyzedQuery {
    AnalyzedQuery {
        original_query: query.to_string(),
        processed_query: normalize_query(query),
        analysis: QueryAnalysis {
            intent: detect_intent(query),
            query_type: classify_query_type(query),
            keywords: extract_keywords(query),
            expansions: expand_query(query),
        },
    }
}

/// Classify what the user is trying to do. First matching rule wins, checked
/// in a fixed order, so classification is total and deterministic.
pub fn detect_intent(query: &str) -> QueryIntent {
    let lower = query.to_lowercase();
    if QUESTION_WORDS.is_match(&lower) {
        QueryIntent::Question
    } else if SEARCH_VERBS.is_match(&lower) {
        QueryIntent::Search
    } else if COMPARISON_WORDS.is_match(&lower) {
        QueryIntent::Comparison
    } else if SUMMARY_WORDS.is_match(&lower) {
        QueryIntent::Summarization
    } else {
        QueryIntent::General
    }
}

/// Infer the content category the query wording hints at.
///
/// Whole-word matching: "articles" does not trigger the article hint. The
/// result is advisory, feeding the re-ranker's boost and recommendation
/// templates, never a hard store filter.
pub fn classify_query_type(query: &str) -> QueryType {
    let lower = query.to_lowercase();
    if IMAGE_WORDS.is_match(&lower) {
        QueryType::Image
    } else if ARTICLE_WORDS.is_match(&lower) {
        QueryType::Article
    } else if VIDEO_WORDS.is_match(&lower) {
        QueryType::Video
    } else if PRODUCT_WORDS.is_match(&lower) {
        QueryType::Product
    } else {
        QueryType::General
    }
}

/// Lowercase word tokens of at least [`KEYWORD_MIN_CHARS`] characters,
/// minus stop words, ranked by in-query frequency (ties keep first
/// occurrence), truncated to [`KEYWORD_LIMIT`].
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for word in WORD.find_iter(&lower).map(|m| m.as_str()) {
        if word.chars().count() < KEYWORD_MIN_CHARS || STOP_WORDS.contains(&word) {
            continue;
        }
        match counts.iter_mut().find(|(w, _)| w == word) {
            Some((_, n)) => *n += 1,
            None => counts.push((word.to_string(), 1)),
        }
    }
    // Stable sort keeps first-seen words ahead on frequency ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(KEYWORD_LIMIT);
    counts.into_iter().map(|(word, _)| word).collect()
}

/// Expand the query with the fixed synonym table.
///
/// The result lists every lowercased query word first, then the synonyms of
/// each word in word order, deduplicated with first occurrence kept.
pub fn expand_query(query: &str) -> Vec<String> {
    let lower = query.to_lowercase();
    let words: Vec<&str> = WORD.find_iter(&lower).map(|m| m.as_str()).collect();

    let mut expansions: Vec<String> = Vec::new();
    for word in &words {
        if !expansions.iter().any(|e| e == word) {
            expansions.push(word.to_string());
        }
    }
    for word in &words {
        if let Some((_, synonyms)) = SYNONYMS.iter().find(|(key, _)| key == word) {
            for synonym in *synonyms {
                if !expansions.iter().any(|e| e == synonym) {
                    expansions.push(synonym.to_string());
                }
            }
        }
    }
    expansions
}

fn normalize_query(query: &str) -> String {
    let collapsed = WHITESPACE.replace_all(query.trim(), " ");
    let cleaned = DISALLOWED.replace_all(&collapsed, "");
    truncate_chars(&cleaned, EMBED_MAX_INPUT_CHARS).to_string()
}
