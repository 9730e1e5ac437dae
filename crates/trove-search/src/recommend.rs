//! Suggestion generation: autocomplete, related searches, trending, and
//! content-based recommendations.
//!
//! Activated two ways: live autocomplete while the user types, and the
//! zero-result fallback after a search whose re-ranked output is empty. The
//! engine never fails the caller: the only fallible pass (content-based
//! embedding) degrades to an empty list on error.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, warn};

use trove_core::defaults::{
    CONTENT_SIMILARITY_FLOOR, EMPTY_QUERY_CONTENT_LIMIT, KEYWORD_MIN_CHARS,
    RECOMMENDATION_ITEM_SCAN_CAP, RECOMMENDATION_TEXT_CAP, TRENDING_LIMIT_EMPTY_QUERY,
    TRENDING_LIMIT_WITH_QUERY,
};
use trove_core::{
    excerpt, truncate_chars, ContentType, EmbeddingBackend, EmptyStateSuggestions, Error, Item,
    QueryAnalysis, QueryIntent, QueryType, QuickAction, RecommendationSet, Result,
    SearchTelemetry, Suggestion, SuggestionKind,
};

use crate::analyze::analyze;
use crate::cosine_similarity;

/// Query templates offered as autocomplete completions.
const AUTOCOMPLETE_PATTERNS: [&str; 10] = [
    "what is",
    "how to",
    "show me",
    "find all",
    "get me",
    "search for",
    "articles about",
    "videos on",
    "images of",
    "notes about",
];

/// Curated trending suggestions, shown after any learned popular queries.
const CURATED_TRENDING: [(&str, f32); 5] = [
    ("recent saves", 0.9),
    ("important articles", 0.85),
    ("bookmarks from this week", 0.8),
    ("videos to watch", 0.75),
    ("notes and ideas", 0.7),
];

/// Generates query suggestions from the partial query, the user's saved
/// items, and recorded search telemetry.
pub struct Recommender {
    backend: Arc<dyn EmbeddingBackend>,
    telemetry: Arc<dyn SearchTelemetry>,
}

impl Recommender {
    pub fn new(backend: Arc<dyn EmbeddingBackend>, telemetry: Arc<dyn SearchTelemetry>) -> Self {
        Self { backend, telemetry }
    }

    /// Generate the four suggestion channels for a partial query.
    ///
    /// An empty (or blank) query returns only trending and content-profile
    /// suggestions. Never fails; internal errors degrade to empty channels.
    pub async fn recommend(
        &self,
        partial_query: &str,
        user_items: &[Item],
        limit: usize,
    ) -> RecommendationSet {
        if partial_query.trim().is_empty() {
            return RecommendationSet {
                trending: self.trending(TRENDING_LIMIT_EMPTY_QUERY),
                content_based: content_profile_suggestions(user_items, EMPTY_QUERY_CONTENT_LIMIT),
                ..Default::default()
            };
        }

        let analyzed = analyze(partial_query);
        let set = RecommendationSet {
            suggestions: autocomplete_suggestions(partial_query, user_items, limit),
            related_searches: related_searches(&analyzed.analysis, partial_query, limit),
            trending: self.trending(TRENDING_LIMIT_WITH_QUERY),
            content_based: if user_items.is_empty() {
                Vec::new()
            } else {
                self.semantic_content_suggestions(partial_query, user_items, limit)
                    .await
            },
        };
        debug!(
            query = partial_query,
            total = set.total_len(),
            "Recommendation generation complete"
        );
        set
    }

    /// Record one executed search query for future trending suggestions.
    pub fn record_search(&self, query: &str) {
        self.telemetry.record_search(query);
    }

    /// Learned popular queries first, then the curated list.
    fn trending(&self, limit: usize) -> Vec<Suggestion> {
        let mut trending: Vec<Suggestion> = self
            .telemetry
            .popular_queries(3)
            .into_iter()
            .map(|(text, count)| {
                Suggestion::new(text, SuggestionKind::Popular, (count as f32 / 10.0).min(1.0))
            })
            .collect();
        trending.extend(
            CURATED_TRENDING
                .iter()
                .map(|(text, confidence)| {
                    Suggestion::new(*text, SuggestionKind::Trending, *confidence)
                }),
        );
        trending.truncate(limit);
        trending
    }

    /// Suggestions drawn from items semantically close to the query.
    ///
    /// Embedding failure is recovered here: the channel comes back empty
    /// and the surrounding recommendation set is unaffected.
    async fn semantic_content_suggestions(
        &self,
        query: &str,
        items: &[Item],
        limit: usize,
    ) -> Vec<Suggestion> {
        match self.score_items_against_query(query, items).await {
            Ok(mut scored) => {
                scored.retain(|(_, similarity)| *similarity > CONTENT_SIMILARITY_FLOOR);
                scored.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
                });
                scored.truncate(limit);

                let mut suggestions = Vec::new();
                for (item, similarity) in scored {
                    suggestions.push(
                        Suggestion::new(
                            format!("find more like \"{}\"", excerpt(&item.title, 30)),
                            SuggestionKind::ContentBased,
                            similarity,
                        )
                        .with_item(item.id),
                    );
                    for tag in item.tags.iter().take(2) {
                        suggestions.push(Suggestion::new(
                            format!("{} content", tag),
                            SuggestionKind::TagBased,
                            similarity * 0.8,
                        ));
                    }
                }
                suggestions.truncate(limit);
                suggestions
            }
            Err(err) => {
                warn!(error = %err, "Content-based recommendation pass failed");
                Vec::new()
            }
        }
    }

    async fn score_items_against_query<'a>(
        &self,
        query: &str,
        items: &'a [Item],
    ) -> Result<Vec<(&'a Item, f32)>> {
        let mut query_vectors = self.backend.embed_texts(&[query.to_string()]).await?;
        let query_vector = query_vectors
            .pop()
            .ok_or_else(|| Error::Embedding("backend returned no vector for query".to_string()))?;

        let scanned = &items[..items.len().min(RECOMMENDATION_ITEM_SCAN_CAP)];
        let vectors = try_join_all(scanned.iter().map(|item| {
            let backend = Arc::clone(&self.backend);
            let text = truncate_chars(
                &format!(
                    "{} {}",
                    item.title,
                    item.description.as_deref().unwrap_or_default()
                ),
                RECOMMENDATION_TEXT_CAP,
            )
            .to_string();
            async move {
                let mut out = backend.embed_texts(&[text]).await?;
                out.pop().ok_or_else(|| {
                    Error::Embedding("backend returned no vector for item text".to_string())
                })
            }
        }))
        .await?;

        Ok(scanned
            .iter()
            .zip(vectors)
            .map(|(item, vector)| {
                (
                    item,
                    cosine_similarity(query_vector.as_slice(), vector.as_slice()),
                )
            })
            .collect())
    }
}

/// Prefix-driven completions from fixed patterns and the user's own titles
/// and tags.
fn autocomplete_suggestions(partial_query: &str, items: &[Item], limit: usize) -> Vec<Suggestion> {
    let lower = partial_query.to_lowercase();
    let mut texts: Vec<String> = Vec::new();

    for pattern in AUTOCOMPLETE_PATTERNS {
        let first_word = pattern.split(' ').next().unwrap_or(pattern);
        if pattern.starts_with(&lower) || lower.starts_with(first_word) {
            let text = if lower.contains(pattern) {
                pattern.to_string()
            } else {
                format!("{} {}", pattern, lower)
            };
            push_unique(&mut texts, text);
        }
    }

    // Harvest matching terms from the user's items: title words past the
    // keyword length floor, and tags at any length.
    let mut terms: Vec<String> = Vec::new();
    for item in items {
        for word in item.title.to_lowercase().split(' ') {
            if word.chars().count() >= KEYWORD_MIN_CHARS && word.starts_with(&lower) {
                push_unique(&mut terms, word.to_string());
            }
        }
        for tag in &item.tags {
            let tag = tag.to_lowercase();
            if tag.starts_with(&lower) {
                push_unique(&mut terms, tag);
            }
        }
    }
    for term in terms {
        push_unique(&mut texts, term.clone());
        push_unique(&mut texts, format!("articles about {}", term));
        push_unique(&mut texts, format!("{} notes", term));
    }

    texts.truncate(limit);
    texts
        .into_iter()
        .map(|text| Suggestion::new(text, SuggestionKind::Autocomplete, 0.8))
        .collect()
}

/// Searches related to the analyzed query: intent and type templates,
/// expansion terms, and keyword-pair combinations.
fn related_searches(analysis: &QueryAnalysis, query: &str, limit: usize) -> Vec<Suggestion> {
    let mut related: Vec<Suggestion> = Vec::new();
    let keywords = &analysis.keywords;

    if analysis.intent == QueryIntent::Question {
        if let Some(first) = keywords.first() {
            let joined = keywords.join(" ");
            related.push(Suggestion::new(
                format!("how to {}", joined),
                SuggestionKind::Related,
                0.9,
            ));
            related.push(Suggestion::new(
                format!("what is {}", first),
                SuggestionKind::Related,
                0.85,
            ));
            related.push(Suggestion::new(
                format!("examples of {}", joined),
                SuggestionKind::Related,
                0.8,
            ));
        }
    }

    if analysis.query_type != QueryType::General {
        if !keywords.is_empty() {
            related.push(Suggestion::new(
                format!("{}s about {}", analysis.query_type, keywords.join(" ")),
                SuggestionKind::Related,
                0.9,
            ));
        }
        related.push(Suggestion::new(
            format!("recent {}s", analysis.query_type),
            SuggestionKind::Related,
            0.7,
        ));
    }

    if analysis.expansions.len() > 1 {
        let query_lower = query.to_lowercase();
        // A skipped slot (the query itself) still consumes its confidence
        // step.
        for (idx, expansion) in analysis.expansions.iter().take(3).enumerate() {
            if expansion != &query_lower {
                related.push(Suggestion::new(
                    expansion.clone(),
                    SuggestionKind::Expansion,
                    0.9 - idx as f32 * 0.1,
                ));
            }
        }
    }

    if keywords.len() > 1 {
        for combo in keyword_combinations(keywords).into_iter().take(2) {
            related.push(Suggestion::new(combo, SuggestionKind::Combination, 0.75));
        }
    }

    related.truncate(limit);
    related
}

/// Both orderings of every keyword pair, first pair first.
fn keyword_combinations(keywords: &[String]) -> Vec<String> {
    let mut combinations = Vec::new();
    for i in 0..keywords.len().saturating_sub(1) {
        for j in (i + 1)..keywords.len() {
            combinations.push(format!("{} {}", keywords[i], keywords[j]));
            combinations.push(format!("{} {}", keywords[j], keywords[i]));
        }
    }
    combinations
}

/// Empty-query profile of the user's content: top tags and top content
/// types by occurrence, confidence = occurrence fraction.
fn content_profile_suggestions(items: &[Item], limit: usize) -> Vec<Suggestion> {
    let mut tag_counts: Vec<(String, usize)> = Vec::new();
    let mut type_counts: Vec<(ContentType, usize)> = Vec::new();
    for item in items {
        match type_counts
            .iter_mut()
            .find(|(t, _)| *t == item.content_type)
        {
            Some((_, n)) => *n += 1,
            None => type_counts.push((item.content_type, 1)),
        }
        for tag in &item.tags {
            match tag_counts.iter_mut().find(|(t, _)| t == tag) {
                Some((_, n)) => *n += 1,
                None => tag_counts.push((tag.clone(), 1)),
            }
        }
    }

    let total = items.len() as f32;
    let mut suggestions = Vec::new();

    tag_counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (tag, count) in tag_counts.into_iter().take(5) {
        suggestions.push(
            Suggestion::new(
                format!("{} content", tag),
                SuggestionKind::ContentBased,
                (count as f32 / total).min(1.0),
            )
            .with_count(count as i64),
        );
    }

    type_counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (content_type, count) in type_counts.into_iter().take(3) {
        suggestions.push(
            Suggestion::new(
                format!("all {}s", content_type),
                SuggestionKind::ContentType,
                (count as f32 / total).min(1.0),
            )
            .with_count(count as i64),
        );
    }

    suggestions.truncate(limit);
    suggestions
}

fn push_unique(list: &mut Vec<String>, text: String) {
    if !list.contains(&text) {
        list.push(text);
    }
}

/// Onboarding payload for a user with no saved content and no query.
pub fn empty_state_suggestions() -> EmptyStateSuggestions {
    EmptyStateSuggestions {
        quick_actions: vec![
            QuickAction {
                text: "Save your first article".to_string(),
                icon: "📰".to_string(),
                action: "save".to_string(),
            },
            QuickAction {
                text: "Upload an image".to_string(),
                icon: "📸".to_string(),
                action: "upload".to_string(),
            },
            QuickAction {
                text: "Explore features".to_string(),
                icon: "✨".to_string(),
                action: "explore".to_string(),
            },
        ],
        example_queries: vec![
            Suggestion::example("Try: \"articles about AI\""),
            Suggestion::example("Try: \"videos saved last week\""),
            Suggestion::example("Try: \"images with black color\""),
        ],
    }
}
