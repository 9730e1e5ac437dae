//! Core data models for trove.
//!
//! These types are shared across all trove crates and represent the domain
//! entities of the knowledge base: saved items, their typed metadata, search
//! filters, query analysis, ranked results, and recommendation payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Owner identifier used when no authenticated user is attached to a request.
///
/// Seeded in the schema as a real user row so foreign keys hold.
pub const ANONYMOUS_USER_ID: Uuid = Uuid::nil();

// =============================================================================
// ITEM TYPES
// =============================================================================

/// Enumerated category of a saved item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Article,
    Product,
    Image,
    Video,
    #[default]
    Note,
    Bookmark,
    TodoList,
    Receipt,
    Screenshot,
    Document,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Article => "article",
            Self::Product => "product",
            Self::Image => "image",
            Self::Video => "video",
            Self::Note => "note",
            Self::Bookmark => "bookmark",
            Self::TodoList => "todo-list",
            Self::Receipt => "receipt",
            Self::Screenshot => "screenshot",
            Self::Document => "document",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "article" => Ok(Self::Article),
            "product" => Ok(Self::Product),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "note" => Ok(Self::Note),
            "bookmark" => Ok(Self::Bookmark),
            "todo-list" | "todo_list" => Ok(Self::TodoList),
            "receipt" => Ok(Self::Receipt),
            "screenshot" => Ok(Self::Screenshot),
            "document" => Ok(Self::Document),
            _ => Err(format!("Invalid content type: {}", s)),
        }
    }
}

/// One detected object inside an image item, as produced by vision analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImageObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
}

/// Typed metadata attached to an item, keyed by content category.
///
/// Stored as JSONB with the discriminant under `kind` and the variant fields
/// at the top level, so SQL paths like `metadata->>'price'` and
/// `metadata->'objects'` keep working against typed rows. Rows written before
/// the discriminant existed deserialize through [`ItemMetadata::from_json`],
/// which falls back to [`ItemMetadata::Generic`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemMetadata {
    Article {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        key_topics: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        published_at: Option<String>,
    },
    Product {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brand: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        currency: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        colors: Vec<String>,
    },
    Video {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        creator: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_secs: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extracted_text: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        objects: Vec<ImageObject>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        colors: Vec<String>,
    },
    Generic {
        #[serde(flatten)]
        fields: serde_json::Map<String, JsonValue>,
    },
}

impl Default for ItemMetadata {
    fn default() -> Self {
        Self::Generic {
            fields: serde_json::Map::new(),
        }
    }
}

impl ItemMetadata {
    /// Deserialize from a raw JSONB value, tolerating rows without a `kind`
    /// discriminant or with fields that no longer parse into a typed variant.
    pub fn from_json(value: JsonValue) -> Self {
        match serde_json::from_value::<ItemMetadata>(value.clone()) {
            Ok(meta) => meta,
            Err(_) => match value {
                JsonValue::Object(fields) => Self::Generic { fields },
                _ => Self::default(),
            },
        }
    }
}

/// An owned content unit in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub content_type: ContentType,
    pub url: Option<String>,
    pub source_domain: Option<String>,
    /// Typed per-category metadata; see [`ItemMetadata`].
    #[schema(value_type = Object)]
    pub metadata: ItemMetadata,
    pub tags: Vec<String>,
    pub collection_id: Option<Uuid>,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accessed_at: Option<DateTime<Utc>>,
}

impl Item {
    /// The text an embedding is computed over: title, description, and
    /// content joined with single spaces. Missing parts contribute an empty
    /// string; the embedder's preprocessing collapses the extra whitespace.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.description.as_deref().unwrap_or_default(),
            self.content.as_deref().unwrap_or_default()
        )
    }
}

/// A tag with its occurrence count, for popular-tag listings.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

// =============================================================================
// SEARCH FILTER TYPES
// =============================================================================

/// Numeric bounds against the metadata price field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PriceRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Created-at bounds: absolute endpoints plus an optional relative period
/// phrase ("last week") resolved to a lower bound at query time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

/// Structured filters applied conjunctively before vector ranking.
///
/// Every field is independently optional. `suggested_type` is advisory only:
/// it records the analyzer's inferred category for the response echo and the
/// re-ranker's boost, and is never applied as a hard store filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_type: Option<QueryType>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_archived: bool,
}

impl SearchFilters {
    /// Merge request-supplied filters over query-derived ones.
    ///
    /// A field set in `request` (Some, or a non-empty list) wins over the
    /// extracted value; `include_archived` is true when either side asks
    /// for it.
    pub fn overlay(&self, request: &SearchFilters) -> SearchFilters {
        SearchFilters {
            content_type: request.content_type.or(self.content_type),
            tags: if request.tags.is_empty() {
                self.tags.clone()
            } else {
                request.tags.clone()
            },
            is_favorite: request.is_favorite.or(self.is_favorite),
            price: request.price.or(self.price),
            date_range: request.date_range.clone().or(self.date_range.clone()),
            colors: if request.colors.is_empty() {
                self.colors.clone()
            } else {
                request.colors.clone()
            },
            author: request.author.clone().or(self.author.clone()),
            keywords: if request.keywords.is_empty() {
                self.keywords.clone()
            } else {
                request.keywords.clone()
            },
            collection_id: request.collection_id.or(self.collection_id),
            suggested_type: request.suggested_type.or(self.suggested_type),
            include_archived: self.include_archived || request.include_archived,
        }
    }
}

// =============================================================================
// QUERY ANALYSIS TYPES
// =============================================================================

/// What the user is trying to do with a query. First matching rule wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    Question,
    Search,
    Comparison,
    Summarization,
    #[default]
    General,
}

impl std::fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Question => "question",
            Self::Search => "search",
            Self::Comparison => "comparison",
            Self::Summarization => "summarization",
            Self::General => "general",
        };
        write!(f, "{}", s)
    }
}

/// Content category hinted at by the query wording.
///
/// Advisory only: feeds the re-ranker's type boost and recommendation
/// templates, never a hard store filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Image,
    Article,
    Video,
    Product,
    #[default]
    General,
}

impl QueryType {
    /// The content type this hint corresponds to, if any.
    pub fn content_type(&self) -> Option<ContentType> {
        match self {
            Self::Image => Some(ContentType::Image),
            Self::Article => Some(ContentType::Article),
            Self::Video => Some(ContentType::Video),
            Self::Product => Some(ContentType::Product),
            Self::General => None,
        }
    }

    /// Whether a candidate of `content_type` should receive the type boost.
    pub fn matches(&self, content_type: ContentType) -> bool {
        self.content_type() == Some(content_type)
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Image => "image",
            Self::Article => "article",
            Self::Video => "video",
            Self::Product => "product",
            Self::General => "general",
        };
        write!(f, "{}", s)
    }
}

/// Output of the query analyzer: a pure function of the query string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnalysis {
    pub intent: QueryIntent,
    pub query_type: QueryType,
    pub keywords: Vec<String>,
    pub expansions: Vec<String>,
}

/// A query split into the text to embed and the structured filters extracted
/// from it by the filter-extraction collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    pub filters: SearchFilters,
}

// =============================================================================
// RANKING TYPES
// =============================================================================

/// A first-pass search hit: an item plus its cosine distance to the query.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub item: Item,
    /// Cosine distance; 0 = identical direction, smaller is closer.
    pub distance: f32,
}

impl Candidate {
    /// Cosine similarity, `1 - distance`.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Human-readable relevance band for a raw similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum RelevanceLabel {
    #[serde(rename = "Highly Relevant")]
    HighlyRelevant,
    #[serde(rename = "Very Relevant")]
    VeryRelevant,
    #[serde(rename = "Relevant")]
    Relevant,
    #[serde(rename = "Somewhat Relevant")]
    SomewhatRelevant,
    #[serde(rename = "Marginally Relevant")]
    MarginallyRelevant,
}

impl RelevanceLabel {
    /// Band a raw (un-boosted) similarity score.
    pub fn for_score(similarity: f32) -> Self {
        if similarity >= 0.9 {
            Self::HighlyRelevant
        } else if similarity >= 0.8 {
            Self::VeryRelevant
        } else if similarity >= 0.7 {
            Self::Relevant
        } else if similarity >= 0.6 {
            Self::SomewhatRelevant
        } else {
            Self::MarginallyRelevant
        }
    }
}

impl std::fmt::Display for RelevanceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::HighlyRelevant => "Highly Relevant",
            Self::VeryRelevant => "Very Relevant",
            Self::Relevant => "Relevant",
            Self::SomewhatRelevant => "Somewhat Relevant",
            Self::MarginallyRelevant => "Marginally Relevant",
        };
        write!(f, "{}", s)
    }
}

/// A re-ranked search result: the item with its similarity scores attached
/// at the top level of the serialized object.
///
/// The flattened item keeps its own snake_case field names; only the score
/// fields added here are camelCase.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    #[serde(flatten)]
    pub item: Item,
    /// Raw cosine similarity between query and item text.
    pub similarity_score: f32,
    /// Similarity after the content-type boost; the sort key.
    pub boosted_score: f32,
    pub relevance_explanation: RelevanceLabel,
}

// =============================================================================
// RECOMMENDATION TYPES
// =============================================================================

/// How a suggestion was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    Autocomplete,
    Related,
    Expansion,
    Combination,
    ContentBased,
    TagBased,
    ContentType,
    Trending,
    Popular,
    Example,
}

/// A suggested query string with its provenance and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(rename = "itemId", default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, kind: SuggestionKind, confidence: f32) -> Self {
        Self {
            text: text.into(),
            kind,
            confidence: Some(confidence),
            item_id: None,
            count: None,
        }
    }

    /// An example query shown in the empty state; carries no confidence.
    pub fn example(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SuggestionKind::Example,
            confidence: None,
            item_id: None,
            count: None,
        }
    }

    pub fn with_item(mut self, item_id: Uuid) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }
}

/// The four suggestion channels returned by the recommendation engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub suggestions: Vec<Suggestion>,
    pub related_searches: Vec<Suggestion>,
    pub trending: Vec<Suggestion>,
    pub content_based: Vec<Suggestion>,
}

impl RecommendationSet {
    /// The well-shaped empty value returned when recommendation generation
    /// fails internally.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    pub fn total_len(&self) -> usize {
        self.suggestions.len()
            + self.related_searches.len()
            + self.trending.len()
            + self.content_based.len()
    }
}

/// A call-to-action shown when the knowledge base is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuickAction {
    pub text: String,
    pub icon: String,
    pub action: String,
}

/// Onboarding suggestions for a user with no saved content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmptyStateSuggestions {
    pub quick_actions: Vec<QuickAction>,
    pub example_queries: Vec<Suggestion>,
}

// =============================================================================
// EMBEDDING TYPES
// =============================================================================

/// Embedding vector type (re-exported from pgvector).
pub use pgvector::Vector;

/// A stored embedding row: one per (item, model) pair.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub id: Uuid,
    pub item_id: Uuid,
    pub vector: Vector,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// API REQUEST/RESPONSE TYPES
// =============================================================================

/// Inbound search request body.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub query: String,
    pub filters: Option<SearchFilters>,
    pub limit: Option<usize>,
}

/// Pipeline counters echoed back with each search response.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchPerformance {
    /// Candidates returned by the vector index before re-ranking.
    pub initial_results: usize,
    /// Results surviving the re-rank filter and truncation.
    pub reranked_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_relevance: Option<RelevanceLabel>,
}

/// Full search response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub semantic_analysis: QueryAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_query: Option<ParsedQuery>,
    pub filters: SearchFilters,
    pub results: Vec<RankedResult>,
    pub count: usize,
    pub model: String,
    pub performance: SearchPerformance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<RecommendationSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One hit from the similar-items lookup.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimilarItem {
    #[serde(flatten)]
    pub item: Item,
    /// Cosine similarity to the source item.
    pub similarity_score: f32,
}

/// Response envelope for the similar-items lookup.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimilarItemsResponse {
    pub success: bool,
    pub source_item_id: Uuid,
    pub similar_items: Vec<SimilarItem>,
    pub count: usize,
}

/// Response envelope for the suggestions endpoint. Exactly one of the
/// recommendation fields or `suggestions` (the empty state) is populated.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<RecommendationSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popular_tags: Option<Vec<TagCount>>,
    pub has_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<EmptyStateSuggestions>,
}

impl SuggestionsResponse {
    /// The onboarding shape: no query, no saved items.
    pub fn empty_state(suggestions: EmptyStateSuggestions) -> Self {
        Self {
            success: true,
            query: None,
            recommendations: None,
            popular_tags: None,
            has_content: false,
            total_items: None,
            suggestions: Some(suggestions),
        }
    }

    pub fn with_content(
        query: String,
        recommendations: RecommendationSet,
        popular_tags: Vec<TagCount>,
        total_items: usize,
    ) -> Self {
        Self {
            success: true,
            query: Some(query),
            recommendations: Some(recommendations),
            popular_tags: Some(popular_tags),
            has_content: total_items > 0,
            total_items: Some(total_items),
            suggestions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_item() -> Item {
        Item {
            id: Uuid::new_v4(),
            user_id: ANONYMOUS_USER_ID,
            title: "Rust ownership explained".to_string(),
            description: Some("A walkthrough of borrows".to_string()),
            content: Some("Ownership is the core model".to_string()),
            content_type: ContentType::Article,
            url: Some("https://example.com/rust".to_string()),
            source_domain: Some("example.com".to_string()),
            metadata: ItemMetadata::Article {
                author: Some("Niko".to_string()),
                summary: None,
                key_topics: vec!["rust".to_string()],
                published_at: None,
            },
            tags: vec!["rust".to_string(), "programming".to_string()],
            collection_id: None,
            is_favorite: false,
            is_archived: false,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            accessed_at: None,
        }
    }

    #[test]
    fn test_content_type_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ContentType::TodoList).unwrap(),
            "\"todo-list\""
        );
        assert_eq!(
            serde_json::from_str::<ContentType>("\"article\"").unwrap(),
            ContentType::Article
        );
    }

    #[test]
    fn test_content_type_display_round_trip() {
        for ct in [
            ContentType::Article,
            ContentType::Product,
            ContentType::Image,
            ContentType::Video,
            ContentType::Note,
            ContentType::Bookmark,
            ContentType::TodoList,
            ContentType::Receipt,
            ContentType::Screenshot,
            ContentType::Document,
        ] {
            let parsed: ContentType = ct.to_string().parse().unwrap();
            assert_eq!(parsed, ct);
        }
    }

    #[test]
    fn test_content_type_from_str_invalid() {
        assert!("spreadsheet".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_metadata_product_keeps_top_level_fields() {
        let meta = ItemMetadata::Product {
            brand: Some("Acme".to_string()),
            price: Some(299.0),
            currency: Some("USD".to_string()),
            category: None,
            colors: vec!["black".to_string()],
        };
        let json = serde_json::to_value(&meta).unwrap();
        // SQL paths depend on these keys sitting at the object root.
        assert_eq!(json["kind"], "product");
        assert_eq!(json["price"], 299.0);
        assert_eq!(json["colors"][0], "black");
    }

    #[test]
    fn test_metadata_from_json_without_discriminant_falls_back() {
        let legacy = serde_json::json!({"price": "49.99", "source": "scraper"});
        let meta = ItemMetadata::from_json(legacy);
        match meta {
            ItemMetadata::Generic { fields } => {
                assert_eq!(fields["source"], "scraper");
            }
            other => panic!("expected generic fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_metadata_from_json_non_object() {
        assert_eq!(
            ItemMetadata::from_json(JsonValue::Null),
            ItemMetadata::default()
        );
    }

    #[test]
    fn test_metadata_tagged_round_trip() {
        let meta = ItemMetadata::Image {
            extracted_text: Some("receipt total".to_string()),
            objects: vec![ImageObject {
                name: Some("shoe".to_string()),
                colors: vec!["black".to_string()],
            }],
            colors: vec![],
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(ItemMetadata::from_json(json), meta);
    }

    #[test]
    fn test_searchable_text_joins_with_spaces() {
        let item = sample_item();
        assert_eq!(
            item.searchable_text(),
            "Rust ownership explained A walkthrough of borrows Ownership is the core model"
        );
    }

    #[test]
    fn test_searchable_text_with_missing_parts() {
        let mut item = sample_item();
        item.description = None;
        item.content = None;
        assert_eq!(item.searchable_text(), "Rust ownership explained  ");
    }

    #[test]
    fn test_filters_overlay_request_wins() {
        let parsed = SearchFilters {
            colors: vec!["black".to_string()],
            price: Some(PriceRange {
                min: None,
                max: Some(300.0),
            }),
            ..Default::default()
        };
        let request = SearchFilters {
            content_type: Some(ContentType::Product),
            price: Some(PriceRange {
                min: Some(50.0),
                max: None,
            }),
            ..Default::default()
        };
        let combined = parsed.overlay(&request);
        assert_eq!(combined.content_type, Some(ContentType::Product));
        assert_eq!(combined.colors, vec!["black".to_string()]);
        // Request price replaces the extracted one wholesale.
        assert_eq!(combined.price.unwrap().min, Some(50.0));
        assert_eq!(combined.price.unwrap().max, None);
    }

    #[test]
    fn test_filters_overlay_include_archived_is_or() {
        let parsed = SearchFilters {
            include_archived: true,
            ..Default::default()
        };
        let combined = parsed.overlay(&SearchFilters::default());
        assert!(combined.include_archived);
    }

    #[test]
    fn test_filters_serde_camel_case() {
        let json = serde_json::json!({
            "contentType": "product",
            "isFavorite": true,
            "dateRange": {"period": "last week"},
            "collectionId": "00000000-0000-0000-0000-000000000001"
        });
        let filters: SearchFilters = serde_json::from_value(json).unwrap();
        assert_eq!(filters.content_type, Some(ContentType::Product));
        assert_eq!(filters.is_favorite, Some(true));
        assert_eq!(
            filters.date_range.unwrap().period.as_deref(),
            Some("last week")
        );
        assert!(filters.collection_id.is_some());
    }

    #[test]
    fn test_query_type_matches() {
        assert!(QueryType::Image.matches(ContentType::Image));
        assert!(!QueryType::Image.matches(ContentType::Screenshot));
        assert!(!QueryType::General.matches(ContentType::Note));
        assert_eq!(QueryType::General.content_type(), None);
    }

    #[test]
    fn test_relevance_label_bands() {
        assert_eq!(
            RelevanceLabel::for_score(0.95),
            RelevanceLabel::HighlyRelevant
        );
        assert_eq!(RelevanceLabel::for_score(0.9), RelevanceLabel::HighlyRelevant);
        assert_eq!(RelevanceLabel::for_score(0.85), RelevanceLabel::VeryRelevant);
        assert_eq!(RelevanceLabel::for_score(0.75), RelevanceLabel::Relevant);
        assert_eq!(
            RelevanceLabel::for_score(0.65),
            RelevanceLabel::SomewhatRelevant
        );
        assert_eq!(
            RelevanceLabel::for_score(0.4),
            RelevanceLabel::MarginallyRelevant
        );
    }

    #[test]
    fn test_relevance_label_serializes_human_readable() {
        assert_eq!(
            serde_json::to_string(&RelevanceLabel::HighlyRelevant).unwrap(),
            "\"Highly Relevant\""
        );
    }

    #[test]
    fn test_suggestion_wire_shape() {
        let s = Suggestion::new("rust content", SuggestionKind::TagBased, 0.8).with_count(4);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "tag-based");
        assert_eq!(json["confidence"], 0.8);
        assert_eq!(json["count"], 4);
        assert!(json.get("itemId").is_none());
    }

    #[test]
    fn test_suggestion_example_omits_confidence() {
        let json = serde_json::to_value(Suggestion::example("Try: \"articles about AI\"")).unwrap();
        assert_eq!(json["type"], "example");
        assert!(json.get("confidence").is_none());
    }

    #[test]
    fn test_suggestion_item_id_serializes_camel_case() {
        let id = Uuid::new_v4();
        let s = Suggestion::new("find more", SuggestionKind::ContentBased, 0.7).with_item(id);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["itemId"], id.to_string());
    }

    #[test]
    fn test_recommendation_set_empty_shape() {
        let set = RecommendationSet::empty();
        assert!(set.is_empty());
        let json = serde_json::to_value(&set).unwrap();
        assert!(json["suggestions"].as_array().unwrap().is_empty());
        assert!(json["relatedSearches"].as_array().unwrap().is_empty());
        assert!(json["trending"].as_array().unwrap().is_empty());
        assert!(json["contentBased"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_ranked_result_flattens_item() {
        let item = sample_item();
        let ranked = RankedResult {
            item: item.clone(),
            similarity_score: 0.82,
            boosted_score: 0.984,
            relevance_explanation: RelevanceLabel::VeryRelevant,
        };
        let json = serde_json::to_value(&ranked).unwrap();
        // Item fields keep their stored names; score fields are camelCase.
        assert_eq!(json["id"], item.id.to_string());
        assert_eq!(json["title"], "Rust ownership explained");
        assert_eq!(json["content_type"], "article");
        assert_eq!(json["similarityScore"], 0.82f32 as f64);
        assert_eq!(json["relevanceExplanation"], "Very Relevant");
    }

    #[test]
    fn test_search_request_defaults() {
        let req: SearchRequest = serde_json::from_str("{\"query\": \"rust\"}").unwrap();
        assert_eq!(req.query, "rust");
        assert!(req.filters.is_none());
        assert!(req.limit.is_none());
    }

    #[test]
    fn test_suggestions_response_empty_state_shape() {
        let resp = SuggestionsResponse::empty_state(EmptyStateSuggestions {
            quick_actions: vec![QuickAction {
                text: "Save your first article".to_string(),
                icon: "📰".to_string(),
                action: "save".to_string(),
            }],
            example_queries: vec![Suggestion::example("Try: \"articles about AI\"")],
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["hasContent"], false);
        assert!(json["suggestions"]["quickActions"].is_array());
        assert!(json.get("recommendations").is_none());
    }

    #[test]
    fn test_candidate_similarity() {
        let c = Candidate {
            item: sample_item(),
            distance: 0.25,
        };
        assert!((c.similarity() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_anonymous_user_id_is_nil() {
        assert_eq!(
            ANONYMOUS_USER_ID.to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }
}
