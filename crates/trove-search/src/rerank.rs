//! Second-pass relevance scoring over vector-search candidates.
//!
//! The vector index ranks by raw cosine distance against a single stored
//! embedding, which is a coarse first pass. The re-ranker embeds the query
//! and each candidate's full comparison text, scores them with cosine
//! similarity, boosts candidates whose content type matches the query's
//! inferred type, and drops everything below a relevance floor.
//!
//! Re-ranking is a quality enhancement, not a correctness requirement: any
//! internal failure falls back to the vector-distance ordering so the search
//! request still succeeds.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, warn};

use trove_core::defaults::{EMBED_MAX_INPUT_CHARS, MIN_RELEVANCE_THRESHOLD, TYPE_MATCH_BOOST};
use trove_core::{
    truncate_chars, Candidate, EmbeddingBackend, Error, RankedResult, RelevanceLabel, Result,
};

use crate::analyze::classify_query_type;
use crate::cosine_similarity;

struct Scored<'a> {
    candidate: &'a Candidate,
    similarity: f32,
    boosted: f32,
}

/// Re-ranks candidate lists against the raw query text.
pub struct Reranker {
    backend: Arc<dyn EmbeddingBackend>,
}

impl Reranker {
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { backend }
    }

    /// Score, reorder, filter, and truncate a candidate list.
    ///
    /// The survivor set is decided by raw similarity against
    /// [`MIN_RELEVANCE_THRESHOLD`]; the type boost affects ordering among
    /// survivors only. Ties keep the incoming (vector-distance) order.
    ///
    /// Never fails: on any internal error the original candidate list is
    /// returned in its incoming order, scored by first-pass vector distance.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
    ) -> Vec<RankedResult> {
        if candidates.is_empty() {
            return Vec::new();
        }
        let total = candidates.len();
        match self.score(query, &candidates, top_k).await {
            Ok(results) => {
                debug!(
                    candidates = total,
                    survivors = results.len(),
                    threshold = MIN_RELEVANCE_THRESHOLD,
                    "Re-ranking complete"
                );
                results
            }
            Err(err) => {
                warn!(error = %err, "Re-ranking failed, falling back to vector-distance order");
                Self::vector_order_fallback(candidates)
            }
        }
    }

    async fn score(
        &self,
        query: &str,
        candidates: &[Candidate],
        top_k: usize,
    ) -> Result<Vec<RankedResult>> {
        let query_type = classify_query_type(query);

        let mut query_vectors = self.backend.embed_texts(&[query.to_string()]).await?;
        let query_vector = query_vectors
            .pop()
            .ok_or_else(|| Error::Embedding("backend returned no vector for query".to_string()))?;

        // One concurrent embedding task per candidate, joined in input order.
        let doc_vectors = try_join_all(candidates.iter().map(|candidate| {
            let backend = Arc::clone(&self.backend);
            let text =
                truncate_chars(&candidate.item.searchable_text(), EMBED_MAX_INPUT_CHARS)
                    .to_string();
            async move {
                let mut vectors = backend.embed_texts(&[text]).await?;
                vectors.pop().ok_or_else(|| {
                    Error::Embedding("backend returned no vector for candidate".to_string())
                })
            }
        }))
        .await?;

        let mut scored: Vec<Scored<'_>> = candidates
            .iter()
            .zip(doc_vectors)
            .map(|(candidate, vector)| {
                let similarity = cosine_similarity(query_vector.as_slice(), vector.as_slice());
                let boosted = if query_type.matches(candidate.item.content_type) {
                    similarity * TYPE_MATCH_BOOST
                } else {
                    similarity
                };
                Scored {
                    candidate,
                    similarity,
                    boosted,
                }
            })
            .collect();

        // Stable sort: boosted-score ties keep vector-distance order.
        scored.sort_by(|a, b| {
            b.boosted
                .partial_cmp(&a.boosted)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        // Survival is decided by the raw score; the boost never rescues a
        // below-floor candidate.
        scored.retain(|s| s.similarity >= MIN_RELEVANCE_THRESHOLD);
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|s| RankedResult {
                item: s.candidate.item.clone(),
                similarity_score: s.similarity,
                boosted_score: s.boosted,
                relevance_explanation: RelevanceLabel::for_score(s.similarity),
            })
            .collect())
    }

    fn vector_order_fallback(candidates: Vec<Candidate>) -> Vec<RankedResult> {
        candidates
            .into_iter()
            .map(|candidate| {
                let similarity = candidate.similarity();
                RankedResult {
                    item: candidate.item,
                    similarity_score: similarity,
                    boosted_score: similarity,
                    relevance_explanation: RelevanceLabel::for_score(similarity),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use trove_core::{ContentType, Item, ItemMetadata, ANONYMOUS_USER_ID};
    use trove_embed::mock::MockEmbeddingBackend;
    use uuid::Uuid;

    const DIM: usize = 4;

    fn item(title: &str, content_type: ContentType) -> Item {
        let now = Utc::now();
        Item {
            id: Uuid::new_v4(),
            user_id: ANONYMOUS_USER_ID,
            title: title.to_string(),
            description: None,
            content: None,
            content_type,
            url: None,
            source_domain: None,
            metadata: ItemMetadata::default(),
            tags: Vec::new(),
            collection_id: None,
            is_favorite: false,
            is_archived: false,
            created_at: now,
            updated_at: now,
            accessed_at: None,
        }
    }

    fn candidate(title: &str, content_type: ContentType, distance: f32) -> Candidate {
        Candidate {
            item: item(title, content_type),
            distance,
        }
    }

    /// Unit vector at `p` similarity to the axis-0 unit vector.
    fn lean(p: f32) -> Vec<f32> {
        vec![p, (1.0 - p * p).sqrt(), 0.0, 0.0]
    }

    fn axis0() -> Vec<f32> {
        vec![1.0, 0.0, 0.0, 0.0]
    }

    fn backend() -> MockEmbeddingBackend {
        MockEmbeddingBackend::new()
            .with_dimension(DIM)
            .with_mapping("qvec", axis0())
    }

    #[tokio::test]
    async fn test_sorted_descending_by_boosted_score() {
        let backend = backend()
            .with_mapping("alpha", lean(0.5))
            .with_mapping("beta", lean(0.9))
            .with_mapping("gamma", lean(0.72));
        let reranker = Reranker::new(Arc::new(backend));

        let candidates = vec![
            candidate("alpha doc", ContentType::Note, 0.1),
            candidate("beta doc", ContentType::Note, 0.2),
            candidate("gamma doc", ContentType::Note, 0.3),
        ];
        let results = reranker.rerank("qvec rust", candidates, 10).await;

        assert_eq!(results.len(), 3);
        for pair in results.windows(2) {
            assert!(pair[0].boosted_score >= pair[1].boosted_score);
        }
        assert_eq!(results[0].item.title, "beta doc");
        assert_eq!(results[2].item.title, "alpha doc");
    }

    #[tokio::test]
    async fn test_relevance_floor_uses_raw_similarity() {
        let backend = backend()
            .with_mapping("keeper", lean(0.36))
            .with_mapping("dropped", lean(0.34));
        let reranker = Reranker::new(Arc::new(backend));

        let candidates = vec![
            candidate("keeper doc", ContentType::Note, 0.1),
            candidate("dropped doc", ContentType::Note, 0.2),
        ];
        let results = reranker.rerank("qvec", candidates, 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.title, "keeper doc");
    }

    #[tokio::test]
    async fn test_boost_never_rescues_below_floor() {
        // Raw 0.3 boosts to 0.36, above the floor, but survival is decided
        // on the raw score.
        let backend = backend().with_mapping("lowmatch", lean(0.3));
        let reranker = Reranker::new(Arc::new(backend));

        let candidates = vec![candidate("lowmatch doc", ContentType::Article, 0.1)];
        let results = reranker.rerank("article qvec", candidates, 10).await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_type_boost_reorders_survivors() {
        let backend = backend()
            .with_mapping("offtype", lean(0.82))
            .with_mapping("ontype", lean(0.72));
        let reranker = Reranker::new(Arc::new(backend));

        // The article candidate scores lower raw but boosts past the note.
        let candidates = vec![
            candidate("offtype doc", ContentType::Note, 0.1),
            candidate("ontype doc", ContentType::Article, 0.2),
        ];
        let results = reranker.rerank("article qvec", candidates, 10).await;

        assert_eq!(results[0].item.title, "ontype doc");
        assert!((results[0].similarity_score - 0.72).abs() < 1e-3);
        assert!((results[0].boosted_score - 0.72 * TYPE_MATCH_BOOST).abs() < 1e-3);
        assert_eq!(results[1].item.title, "offtype doc");
        assert!((results[1].boosted_score - 0.82).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_labels_come_from_raw_score_not_boosted() {
        let backend = backend().with_mapping("ontype", lean(0.72));
        let reranker = Reranker::new(Arc::new(backend));

        let candidates = vec![candidate("ontype doc", ContentType::Article, 0.1)];
        let results = reranker.rerank("article qvec", candidates, 10).await;

        // Boosted score is ~0.86 but the label bands the raw 0.72.
        assert_eq!(results[0].relevance_explanation, RelevanceLabel::Relevant);
    }

    #[tokio::test]
    async fn test_boost_does_not_change_survivor_set() {
        let make_backend = || {
            backend()
                .with_mapping("alpha", lean(0.8))
                .with_mapping("beta", lean(0.5))
                .with_mapping("gamma", lean(0.2))
        };
        let make_candidates = || {
            vec![
                candidate("alpha doc", ContentType::Article, 0.1),
                candidate("beta doc", ContentType::Note, 0.2),
                candidate("gamma doc", ContentType::Article, 0.3),
            ]
        };

        let boosted = Reranker::new(Arc::new(make_backend()))
            .rerank("article qvec", make_candidates(), 10)
            .await;
        let neutral = Reranker::new(Arc::new(make_backend()))
            .rerank("qvec", make_candidates(), 10)
            .await;

        let mut boosted_titles: Vec<_> =
            boosted.iter().map(|r| r.item.title.clone()).collect();
        let mut neutral_titles: Vec<_> =
            neutral.iter().map(|r| r.item.title.clone()).collect();
        boosted_titles.sort();
        neutral_titles.sort();
        assert_eq!(boosted_titles, neutral_titles);
    }

    #[tokio::test]
    async fn test_truncates_to_top_k() {
        let backend = backend()
            .with_mapping("alpha", lean(0.9))
            .with_mapping("beta", lean(0.8))
            .with_mapping("gamma", lean(0.7))
            .with_mapping("delta", lean(0.6));
        let reranker = Reranker::new(Arc::new(backend));

        let candidates = vec![
            candidate("alpha doc", ContentType::Note, 0.1),
            candidate("beta doc", ContentType::Note, 0.2),
            candidate("gamma doc", ContentType::Note, 0.3),
            candidate("delta doc", ContentType::Note, 0.4),
        ];
        let results = reranker.rerank("qvec", candidates, 2).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].item.title, "alpha doc");
        assert_eq!(results[1].item.title, "beta doc");
    }

    #[tokio::test]
    async fn test_score_ties_keep_incoming_order() {
        let backend = backend().with_mapping("twin", lean(0.9));
        let reranker = Reranker::new(Arc::new(backend));

        let first = candidate("twin first", ContentType::Note, 0.1);
        let second = candidate("twin second", ContentType::Note, 0.2);
        let results = reranker.rerank("qvec", vec![first, second], 10).await;

        assert_eq!(results[0].item.title, "twin first");
        assert_eq!(results[1].item.title, "twin second");
    }

    #[tokio::test]
    async fn test_fallback_on_embedding_failure() {
        let backend = MockEmbeddingBackend::new().with_dimension(DIM).failing();
        let reranker = Reranker::new(Arc::new(backend));

        let candidates = vec![
            candidate("first doc", ContentType::Note, 0.05),
            candidate("second doc", ContentType::Note, 0.25),
            candidate("third doc", ContentType::Note, 0.45),
        ];
        let results = reranker.rerank("qvec", candidates, 2).await;

        // Original order and length, scored by 1 - distance; top_k does not
        // apply on the fallback path.
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].item.title, "first doc");
        assert!((results[0].similarity_score - 0.95).abs() < 1e-6);
        assert_eq!(results[0].relevance_explanation, RelevanceLabel::HighlyRelevant);
        assert!((results[2].similarity_score - 0.55).abs() < 1e-6);
        assert_eq!(
            results[2].relevance_explanation,
            RelevanceLabel::MarginallyRelevant
        );
    }

    #[tokio::test]
    async fn test_one_embedding_call_per_candidate_plus_query() {
        let backend = backend()
            .with_mapping("alpha", lean(0.9))
            .with_mapping("beta", lean(0.8));
        let reranker = Reranker::new(Arc::new(backend.clone()));

        let candidates = vec![
            candidate("alpha doc", ContentType::Note, 0.1),
            candidate("beta doc", ContentType::Note, 0.2),
        ];
        reranker.rerank("qvec", candidates, 10).await;

        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_candidates_skip_embedding() {
        let backend = backend();
        let reranker = Reranker::new(Arc::new(backend.clone()));

        let results = reranker.rerank("qvec", Vec::new(), 10).await;

        assert!(results.is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_comparison_text_is_truncated() {
        let backend = backend().with_mapping("longdoc", lean(0.9));
        let reranker = Reranker::new(Arc::new(backend.clone()));

        let mut long_item = item("longdoc", ContentType::Note);
        long_item.content = Some("x".repeat(2000));
        let candidates = vec![Candidate {
            item: long_item,
            distance: 0.1,
        }];
        reranker.rerank("qvec", candidates, 10).await;

        let calls = backend.calls();
        // Query text plus one candidate text, capped at the embed ceiling.
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].chars().count(), EMBED_MAX_INPUT_CHARS);
    }
}
