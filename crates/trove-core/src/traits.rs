//! Core traits for trove abstractions.
//!
//! These traits define the seams between the search pipeline and its
//! collaborators: the embedding backend, the item store, search telemetry,
//! and the query filter extractor. Concrete implementations live in the
//! backend crates; handlers and engines depend only on these interfaces.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// EMBEDDING BACKEND
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns one vector per input text, in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<crate::Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Check if the backend is available and responding.
    ///
    /// Best-effort: `Ok(false)` means unreachable, not failed. In-process
    /// backends are always available.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

// =============================================================================
// ITEM REPOSITORY
// =============================================================================

/// Read access to the item store, always scoped to one owner.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// First-pass vector search: cosine-distance ranking over the owner's
    /// items, restricted by the structured filters, against embeddings of
    /// the given model. Archived items are excluded unless the filters say
    /// otherwise. Callers that re-rank afterwards should request more
    /// candidates than they intend to keep.
    async fn search_by_vector(
        &self,
        user_id: Uuid,
        vector: &Vector,
        model: &str,
        filters: &SearchFilters,
        limit: i64,
    ) -> Result<Vec<Candidate>>;

    /// Items of the same content type closest to the given item's stored
    /// embedding, excluding the item itself and archived items.
    ///
    /// Fails with a not-found error when the item does not exist for this
    /// owner or has no embedding under `model`.
    async fn find_similar_to_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        model: &str,
        limit: i64,
    ) -> Result<Vec<Candidate>>;

    /// Most recently created non-archived items, for recommendation passes.
    async fn list_recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<Item>>;

    /// Tags ranked by how many of the owner's items carry them.
    async fn popular_tags(&self, user_id: Uuid, limit: i64) -> Result<Vec<TagCount>>;
}

// =============================================================================
// SEARCH TELEMETRY
// =============================================================================

/// Process-wide search-frequency tracking behind trending suggestions.
///
/// Implementations are synchronous and must be cheap: `record_search` sits on
/// the zero-result search path and is best-effort, never a failure source.
pub trait SearchTelemetry: Send + Sync {
    /// Record one executed search query.
    fn record_search(&self, query: &str);

    /// The most frequent recorded queries, most popular first.
    fn popular_queries(&self, limit: usize) -> Vec<(String, u32)>;

    /// Number of queries currently retained in history.
    fn history_len(&self) -> usize;
}

/// Telemetry sink that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTelemetry;

impl SearchTelemetry for NoOpTelemetry {
    fn record_search(&self, _query: &str) {}

    fn popular_queries(&self, _limit: usize) -> Vec<(String, u32)> {
        Vec::new()
    }

    fn history_len(&self) -> usize {
        0
    }
}

// =============================================================================
// FILTER EXTRACTION
// =============================================================================

/// Collaborator that splits a natural-language query into the text to embed
/// and structured filters ("black shoes under $300" becomes a color filter,
/// a price ceiling, and the residual search text).
#[async_trait]
pub trait FilterExtractor: Send + Sync {
    async fn parse_query(&self, query: &str) -> Result<ParsedQuery>;
}

/// Extractor that passes the query through untouched, with no filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpFilterExtractor;

#[async_trait]
impl FilterExtractor for NoOpFilterExtractor {
    async fn parse_query(&self, _query: &str) -> Result<ParsedQuery> {
        Ok(ParsedQuery::default())
    }
}
