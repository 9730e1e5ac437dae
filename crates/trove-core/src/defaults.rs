//! Centralized default constants for the trove retrieval pipeline.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates should reference these constants instead of defining their
//! own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name.
pub const EMBED_MODEL: &str = "all-mpnet-base-v2";

/// Default base URL for the OpenAI-compatible embedding endpoint.
pub const EMBED_BASE_URL: &str = "http://localhost:8080";

/// Default embedding vector dimension for all-mpnet-base-v2.
///
/// Dimensionality is a model property, not a constant of the system: the
/// store has held 384-, 768-, and 3072-dimension vectors across model
/// generations, so callers must always read the dimension off the backend.
pub const EMBED_DIMENSION: usize = 768;

/// Input ceiling in characters for sentence-transformer class models.
/// Text beyond this is truncated before embedding.
pub const EMBED_MAX_INPUT_CHARS: usize = 512;

/// Input ceiling in characters for remote embedding APIs with large context
/// windows. Used when `TROVE_EMBED_MAX_INPUT_CHARS` raises the default.
pub const EMBED_REMOTE_MAX_INPUT_CHARS: usize = 8000;

/// Maximum entries held by the embedding cache before FIFO eviction.
pub const EMBED_CACHE_CAPACITY: usize = 1000;

/// Maximum attempts for one embedding backend request.
pub const EMBED_MAX_RETRIES: u32 = 3;

/// Base delay for embedding retry backoff; doubles per attempt.
pub const EMBED_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Per-request timeout for the embedding backend.
pub const EMBED_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SEARCH & RE-RANKING
// =============================================================================

/// Default number of final search results.
pub const SEARCH_LIMIT_DEFAULT: i64 = 20;

/// Candidate over-fetch multiplier applied before re-ranking. Raw vector
/// distance is a first-pass filter, not the final ordering, so the index is
/// asked for more rows than the caller wants back.
pub const RERANK_CANDIDATE_MULTIPLIER: i64 = 3;

/// Minimum raw similarity a candidate must reach to survive re-ranking.
/// Applied to the unboosted score; the type boost affects ordering only.
pub const MIN_RELEVANCE_THRESHOLD: f32 = 0.35;

/// Multiplier applied to a candidate's similarity when its content type
/// matches the analyzer's non-general query type.
pub const TYPE_MATCH_BOOST: f32 = 1.2;

/// Default limit for the similar-items lookup.
pub const SIMILAR_ITEMS_LIMIT: i64 = 10;

// =============================================================================
// QUERY ANALYSIS
// =============================================================================

/// Maximum keywords kept after frequency ranking.
pub const KEYWORD_LIMIT: usize = 10;

/// Minimum token length for keyword extraction; shorter tokens are dropped.
pub const KEYWORD_MIN_CHARS: usize = 4;

// =============================================================================
// RECOMMENDATIONS
// =============================================================================

/// Default number of recommendations per category.
pub const RECOMMENDATION_LIMIT: usize = 10;

/// Maximum user items scanned by the content-based similarity pass.
pub const RECOMMENDATION_ITEM_SCAN_CAP: usize = 50;

/// Character cap on the title+description text embedded per item in the
/// content-based pass.
pub const RECOMMENDATION_TEXT_CAP: usize = 200;

/// Minimum similarity for an item to yield a content-based suggestion.
pub const CONTENT_SIMILARITY_FLOOR: f32 = 0.6;

/// Trending suggestions returned alongside a non-empty query.
pub const TRENDING_LIMIT_WITH_QUERY: usize = 3;

/// Trending suggestions returned for an empty query.
pub const TRENDING_LIMIT_EMPTY_QUERY: usize = 5;

/// Content-profile suggestions (top tags plus top content types) returned
/// for an empty query.
pub const EMPTY_QUERY_CONTENT_LIMIT: usize = 5;

/// Entries kept in the search-telemetry history ring.
pub const SEARCH_HISTORY_CAP: usize = 100;

/// Items fetched for the zero-result recommendation fallback.
pub const FALLBACK_ITEM_FETCH_LIMIT: i64 = 100;

/// Popular tags returned by the suggestions endpoint.
pub const POPULAR_TAG_LIMIT: i64 = 10;

// =============================================================================
// RETRIEVAL-AUGMENTED CONTEXT
// =============================================================================

/// Character cap on the per-item content excerpt in the assembled context.
pub const CONTEXT_EXCERPT_CHARS: usize = 500;
