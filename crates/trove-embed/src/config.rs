//! Embedding configuration.

use trove_core::defaults;

/// Configuration for the embedding layer.
///
/// Covers both the HTTP backend (endpoint, auth, retry policy) and the
/// caching/preprocessing wrapper (input ceiling, cache capacity).
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    /// Base URL of the OpenAI-compatible embedding endpoint.
    pub base_url: String,
    /// Bearer token for the endpoint (optional for local servers).
    pub api_key: Option<String>,
    /// Model requested from the backend and pinned on stored embeddings.
    pub model: String,
    /// Expected embedding dimension.
    pub dimension: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum attempts per request, including the first.
    pub max_retries: u32,
    /// Base delay for retry backoff; doubles per subsequent attempt.
    pub retry_base_delay_ms: u64,
    /// Character ceiling applied during preprocessing.
    pub max_input_chars: usize,
    /// Character ceiling the HTTP backend clamps raw inputs to, for callers
    /// that reach it without going through preprocessing.
    pub remote_max_input_chars: usize,
    /// Entries held by the embedding cache before FIFO eviction.
    pub cache_capacity: usize,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::EMBED_BASE_URL.to_string(),
            api_key: None,
            model: defaults::EMBED_MODEL.to_string(),
            dimension: defaults::EMBED_DIMENSION,
            timeout_secs: defaults::EMBED_REQUEST_TIMEOUT_SECS,
            max_retries: defaults::EMBED_MAX_RETRIES,
            retry_base_delay_ms: defaults::EMBED_RETRY_BASE_DELAY_MS,
            max_input_chars: defaults::EMBED_MAX_INPUT_CHARS,
            remote_max_input_chars: defaults::EMBED_REMOTE_MAX_INPUT_CHARS,
            cache_capacity: defaults::EMBED_CACHE_CAPACITY,
        }
    }
}

impl EmbedConfig {
    /// Load configuration from `TROVE_EMBED_*` environment variables,
    /// falling back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            base_url: std::env::var("TROVE_EMBED_BASE_URL").unwrap_or(base.base_url),
            api_key: std::env::var("TROVE_EMBED_API_KEY").ok(),
            model: std::env::var("TROVE_EMBED_MODEL").unwrap_or(base.model),
            dimension: std::env::var("TROVE_EMBED_DIM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.dimension),
            timeout_secs: std::env::var("TROVE_EMBED_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.timeout_secs),
            max_retries: std::env::var("TROVE_EMBED_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.max_retries),
            retry_base_delay_ms: std::env::var("TROVE_EMBED_RETRY_BASE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.retry_base_delay_ms),
            max_input_chars: std::env::var("TROVE_EMBED_MAX_INPUT_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.max_input_chars),
            remote_max_input_chars: base.remote_max_input_chars,
            cache_capacity: std::env::var("TROVE_EMBED_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.cache_capacity),
        }
    }
}
