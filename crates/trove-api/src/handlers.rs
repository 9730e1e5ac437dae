//! Search pipeline HTTP handlers.
//!
//! Thin orchestration over the engine crates: each handler validates input,
//! drives the stores and engines through [`AppState`], and shapes the
//! response envelope. Collaborators with a degraded answer (filter
//! extraction, recommendations) are absorbed with a warning; store and
//! embedding failures surface as error responses.

use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use trove_core::defaults::{
    FALLBACK_ITEM_FETCH_LIMIT, POPULAR_TAG_LIMIT, RECOMMENDATION_LIMIT,
    RERANK_CANDIDATE_MULTIPLIER, SEARCH_LIMIT_DEFAULT, SIMILAR_ITEMS_LIMIT,
};
use trove_core::{
    EmbeddingBackend, Error, FilterExtractor, ItemRepository, ParsedQuery, QueryType,
    SearchPerformance, SearchRequest, SearchResponse, SimilarItem, SimilarItemsResponse,
    SuggestionsResponse, ANONYMOUS_USER_ID,
};
use trove_search::{analyze, empty_state_suggestions};

use crate::{ApiError, AppState};

/// Hint returned alongside an empty result set.
const NO_RESULTS_MESSAGE: &str =
    "No results found. Try the suggestions below or save some content first!";

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SuggestionsParams {
    /// Partial query to complete; absent or empty means "no query yet".
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    /// Maximum number of neighbors to return.
    pub limit: Option<i64>,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Semantic search over the owner's items.
///
/// POST /api/search
///
/// Analyzes the query, merges extracted and request-supplied filters,
/// embeds the search text, over-fetches candidates from the vector index,
/// and re-ranks them. A zero-result search still succeeds: it returns
/// recommendations and a hint instead of results.
///
/// # Returns
/// - 200 OK with ranked results (empty result set included)
/// - 400 Bad Request when the query is missing or blank
/// - 502 Bad Gateway when the embedding backend fails after retries
/// - 503 Service Unavailable when the store is unreachable
#[utoipa::path(post, path = "/api/search", tag = "Search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Ranked search results", body = SearchResponse),
        (status = 400, description = "Missing or blank query")))]
pub async fn search_items(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(Error::InvalidInput("query is required".to_string()).into());
    }
    let started = Instant::now();
    let limit = req.limit.unwrap_or(SEARCH_LIMIT_DEFAULT as usize);

    let analyzed = analyze(&req.query);

    // A failed extractor degrades to an unfiltered search, never a failure.
    let parsed = match state.extractor.parse_query(&req.query).await {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(
                subsystem = "api",
                op = "search",
                error = %err,
                "Filter extraction failed, searching unfiltered"
            );
            ParsedQuery::default()
        }
    };
    let mut filters = parsed
        .filters
        .overlay(&req.filters.clone().unwrap_or_default());
    if filters.suggested_type.is_none() && analyzed.analysis.query_type != QueryType::General {
        filters.suggested_type = Some(analyzed.analysis.query_type);
    }

    let embed_text = parsed.search_text.as_deref().unwrap_or(&req.query);
    let mut vectors = state.backend.embed_texts(&[embed_text.to_string()]).await?;
    let query_vector = vectors
        .pop()
        .ok_or_else(|| Error::Embedding("backend returned no vector for query".to_string()))?;

    // Over-fetch so the re-ranker has candidates to discard.
    let candidates = state
        .items
        .search_by_vector(
            ANONYMOUS_USER_ID,
            &query_vector,
            state.backend.model_name(),
            &filters,
            limit as i64 * RERANK_CANDIDATE_MULTIPLIER,
        )
        .await?;
    let initial_results = candidates.len();

    let results = state.reranker.rerank(&req.query, candidates, limit).await;

    let (recommendations, message) = if results.is_empty() {
        let recent = match state
            .items
            .list_recent(ANONYMOUS_USER_ID, FALLBACK_ITEM_FETCH_LIMIT)
            .await
        {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    subsystem = "api",
                    op = "search",
                    error = %err,
                    "Recent-item fetch for recommendations failed"
                );
                Vec::new()
            }
        };
        let recommendations = state
            .recommender
            .recommend(&req.query, &recent, RECOMMENDATION_LIMIT)
            .await;
        state.recommender.record_search(&req.query);
        (Some(recommendations), Some(NO_RESULTS_MESSAGE.to_string()))
    } else {
        (None, None)
    };

    info!(
        subsystem = "api",
        op = "search",
        query = %req.query,
        candidate_count = initial_results,
        result_count = results.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Search complete"
    );

    Ok(Json(SearchResponse {
        success: true,
        query: req.query,
        semantic_analysis: analyzed.analysis,
        parsed_query: Some(parsed),
        filters,
        count: results.len(),
        model: state.backend.model_name().to_string(),
        performance: SearchPerformance {
            initial_results,
            reranked_results: results.len(),
            top_relevance: results.first().map(|r| r.relevance_explanation),
        },
        results,
        recommendations,
        message,
    }))
}

/// Query suggestions and recommendations.
///
/// GET /api/search/suggestions
///
/// With no query and no saved content this returns the onboarding empty
/// state; otherwise the four recommendation channels plus popular tags.
///
/// # Returns
/// - 200 OK
/// - 503 Service Unavailable when the store is unreachable
#[utoipa::path(get, path = "/api/search/suggestions", tag = "Suggestions",
    params(("q" = Option<String>, Query, description = "Partial query to complete")),
    responses(
        (status = 200, description = "Recommendations and popular tags", body = SuggestionsResponse)))]
pub async fn get_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionsParams>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let query = params.q.unwrap_or_default();

    let items = state
        .items
        .list_recent(ANONYMOUS_USER_ID, FALLBACK_ITEM_FETCH_LIMIT)
        .await?;

    if query.is_empty() && items.is_empty() {
        return Ok(Json(SuggestionsResponse::empty_state(
            empty_state_suggestions(),
        )));
    }

    let recommendations = state
        .recommender
        .recommend(&query, &items, RECOMMENDATION_LIMIT)
        .await;
    let popular_tags = state
        .items
        .popular_tags(ANONYMOUS_USER_ID, POPULAR_TAG_LIMIT)
        .await?;

    Ok(Json(SuggestionsResponse::with_content(
        query,
        recommendations,
        popular_tags,
        items.len(),
    )))
}

/// Items similar to a saved item.
///
/// GET /api/search/similar/:item_id
///
/// Nearest same-content-type neighbors of the item's stored embedding.
///
/// # Returns
/// - 200 OK
/// - 404 Not Found when the item is missing or has no stored embedding
///   under the configured model
#[utoipa::path(get, path = "/api/search/similar/{item_id}", tag = "Search",
    params(
        ("item_id" = Uuid, Path, description = "Source item"),
        ("limit" = Option<i64>, Query, description = "Maximum neighbors to return")),
    responses(
        (status = 200, description = "Similar items", body = SimilarItemsResponse),
        (status = 404, description = "Unknown item or no stored embedding")))]
pub async fn find_similar_items(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Query(params): Query<SimilarParams>,
) -> Result<Json<SimilarItemsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(SIMILAR_ITEMS_LIMIT);

    let candidates = state
        .items
        .find_similar_to_item(ANONYMOUS_USER_ID, item_id, state.backend.model_name(), limit)
        .await?;

    let similar_items: Vec<SimilarItem> = candidates
        .into_iter()
        .map(|candidate| SimilarItem {
            similarity_score: candidate.similarity(),
            item: candidate.item,
        })
        .collect();

    Ok(Json(SimilarItemsResponse {
        success: true,
        source_item_id: item_id,
        count: similar_items.len(),
        similar_items,
    }))
}

/// Service health, including embedding backend reachability.
///
/// GET /health
///
/// Always 200; a down embedding backend reports `"degraded"` in the body
/// rather than failing the probe, since search still partially works
/// (cached vectors, suggestions).
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Service status")))]
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let backend_up = state.backend.health_check().await.unwrap_or(false);
    Json(serde_json::json!({
        "status": if backend_up { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.backend.model_name(),
    }))
}

/// GET /api/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(crate::ApiDoc::openapi())
}

// =============================================================================
// TESTS
// =============================================================================
