//! # trove-search
//!
//! Query understanding, re-ranking, and recommendation engines for trove.
//!
//! This crate provides:
//! - Lexical query analysis: intent, content-type hint, keywords, expansions
//! - Second-pass re-ranking of vector-search candidates with a content-type
//!   boost and a relevance floor
//! - Recommendation generation: autocomplete, related searches, trending,
//!   and content-based suggestions
//! - Retrieval-augmented context assembly for the chat responder
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trove_search::{analyze, Reranker};
//!
//! let analysis = analyze("find articles about rust");
//! let reranker = Reranker::new(Arc::clone(&backend));
//! let results = reranker.rerank("find articles about rust", candidates, 20).await;
//! ```

pub mod analyze;
pub mod context;
pub mod recommend;
pub mod rerank;

// Re-export core types
pub use trove_core::*;

// Re-export engine types
pub use analyze::{analyze, AnalyzedQuery};
pub use context::build_context;
pub use recommend::{empty_state_suggestions, Recommender};
pub use rerank::Reranker;

/// Cosine similarity between two vectors.
///
/// Zero-magnitude input yields 0.0 rather than NaN, so degenerate vectors
/// (empty preprocessed text) rank last instead of poisoning the sort.
/// Components are compared pairwise; callers are responsible for matching
/// dimensions.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}
