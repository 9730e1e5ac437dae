//! trove-api - HTTP API server for trove

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use trove_core::{
    new_v7, ContentType, DateRange, EmbeddingBackend, EmptyStateSuggestions, FilterExtractor,
    InMemoryTelemetry, Item, ItemRepository, NoOpFilterExtractor, ParsedQuery, PriceRange,
    QueryAnalysis, QueryIntent, QueryType, QuickAction, RankedResult, RecommendationSet,
    RelevanceLabel, SearchFilters, SearchPerformance, SearchRequest, SearchResponse,
    SearchTelemetry, SimilarItem, SimilarItemsResponse, Suggestion, SuggestionKind,
    SuggestionsResponse, TagCount,
};
use trove_db::{create_pool, Database};
use trove_embed::{Embedder, HttpEmbeddingBackend};
use trove_search::{Recommender, Reranker};

use handlers::{find_similar_items, get_suggestions, health_check, openapi_json, search_items};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically. That makes
/// log correlation cheap when chasing a slow search through the pipeline.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = new_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared state handed to every handler.
///
/// The store, embedding backend, and filter extractor sit behind trait
/// objects so tests can swap in scripted implementations.
#[derive(Clone)]
struct AppState {
    items: Arc<dyn ItemRepository>,
    backend: Arc<dyn EmbeddingBackend>,
    extractor: Arc<dyn FilterExtractor>,
    reranker: Arc<Reranker>,
    recommender: Arc<Recommender>,
}

// =============================================================================
// OPENAPI DOCUMENT
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trove API",
        description = "Semantic search over a personal knowledge base"
    ),
    paths(
        handlers::search_items,
        handlers::get_suggestions,
        handlers::find_similar_items,
        handlers::health_check,
    ),
    components(schemas(
        ContentType,
        DateRange,
        EmptyStateSuggestions,
        Item,
        ParsedQuery,
        PriceRange,
        QueryAnalysis,
        QueryIntent,
        QueryType,
        QuickAction,
        RankedResult,
        RecommendationSet,
        RelevanceLabel,
        SearchFilters,
        SearchPerformance,
        SearchRequest,
        SearchResponse,
        SimilarItem,
        SimilarItemsResponse,
        Suggestion,
        SuggestionKind,
        SuggestionsResponse,
        TagCount,
    )),
    tags(
        (name = "Search", description = "Semantic search and similar-item lookup"),
        (name = "Suggestions", description = "Autocomplete and recommendations"),
        (name = "System", description = "Health checks and system info")
    )
)]
struct ApiDoc;

// =============================================================================
// ERROR HANDLING
// =============================================================================

/// Boundary wrapper mapping core errors onto HTTP responses.
///
/// The status comes from [`trove_core::Error::status_code`]; the body is the
/// `{"error": "..."}` shape every endpoint shares.
#[derive(Debug)]
struct ApiError(trove_core::Error);

impl From<trove_core::Error> for ApiError {
    fn from(err: trove_core::Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(serde_json::json!({
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Assemble the application router over the given state.
fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/search", post(search_items))
        .route("/api/search/suggestions", get(get_suggestions))
        .route("/api/search/similar/:item_id", get(find_similar_items))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trove_api=debug,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/trove".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse()
        .unwrap_or(3001);

    let pool = create_pool(&database_url).await?;
    let db = Database::new(pool);

    let http_backend = HttpEmbeddingBackend::from_env()?;
    match http_backend.health_check().await {
        Ok(true) => info!(
            model = http_backend.model_name(),
            "Embedding backend reachable"
        ),
        Ok(false) => warn!("Embedding backend unreachable, searches will retry on demand"),
        Err(err) => warn!(error = %err, "Embedding backend probe failed"),
    }
    let backend: Arc<dyn EmbeddingBackend> = Arc::new(Embedder::new(Arc::new(http_backend)));

    let telemetry: Arc<dyn SearchTelemetry> = Arc::new(InMemoryTelemetry::new());
    let state = AppState {
        items: Arc::new(db.items),
        backend: Arc::clone(&backend),
        extractor: Arc::new(NoOpFilterExtractor),
        reranker: Arc::new(Reranker::new(Arc::clone(&backend))),
        recommender: Arc::new(Recommender::new(backend, telemetry)),
    };

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
