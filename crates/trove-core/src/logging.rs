//! Structured logging schema and field name constants for trove.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (candidates, cache keys) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across a request's sub-calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "search", "db", "embed"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "reranker", "recommender", "http_backend", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "embed", "rerank", "recommend"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Item UUID being operated on.
pub const ITEM_ID: &str = "item_id";

/// Owner UUID scoping the operation.
pub const USER_ID: &str = "user_id";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of candidates entering the re-ranker.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Number of input texts sent to an embedding backend.
pub const INPUT_COUNT: &str = "input_count";

/// Whether an embedding was served from cache.
pub const CACHE_HIT: &str = "cache_hit";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for embedding.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
