//! Validating, preprocessing, caching embedder.
//!
//! [`Embedder`] wraps any [`EmbeddingBackend`] and is itself one, so callers
//! compose it freely: the search pipeline talks to `dyn EmbeddingBackend`
//! and never knows whether a cache sits in front of the wire.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, instrument};

use trove_core::{defaults, EmbeddingBackend, Error, Result, Vector};

use crate::cache::{cache_key, EmbeddingCache};
use crate::preprocess::preprocess;

/// Embedding front-end: validation, preprocessing, cache, backend.
pub struct Embedder {
    backend: Arc<dyn EmbeddingBackend>,
    cache: Mutex<EmbeddingCache>,
    max_input_chars: usize,
}

impl Embedder {
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self::with_capacity(backend, defaults::EMBED_CACHE_CAPACITY)
    }

    pub fn with_capacity(backend: Arc<dyn EmbeddingBackend>, cache_capacity: usize) -> Self {
        Self {
            backend,
            cache: Mutex::new(EmbeddingCache::new(cache_capacity)),
            max_input_chars: defaults::EMBED_MAX_INPUT_CHARS,
        }
    }

    /// Number of vectors currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Embed a single text.
    ///
    /// Empty or whitespace-only input is rejected; everything else is
    /// normalized, then served from cache when the same normalized content
    /// was embedded before.
    #[instrument(skip(self, text), fields(subsystem = "embed", component = "embedder", op = "embed", text_len = text.len()))]
    pub async fn embed(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("backend returned no vector".to_string()))
    }

    /// Embed a batch, order-preserving.
    ///
    /// Texts sharing normalized content are embedded once per batch; cache
    /// hits skip the backend entirely. The backend sees only the cache
    /// misses, in first-occurrence order.
    #[instrument(skip(self, texts), fields(subsystem = "embed", component = "embedder", op = "embed_batch", input_count = texts.len()))]
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut processed = Vec::with_capacity(texts.len());
        for text in texts {
            if text.trim().is_empty() {
                return Err(Error::InvalidInput(
                    "Text must be a non-empty string".to_string(),
                ));
            }
            let normalized = preprocess(text, self.max_input_chars);
            let key = cache_key(&normalized);
            processed.push((normalized, key));
        }

        // One short lock to collect hits; no await inside.
        let mut resolved: Vec<Option<Vector>> = vec![None; processed.len()];
        let mut miss_keys: Vec<String> = Vec::new();
        let mut miss_texts: Vec<String> = Vec::new();
        {
            let cache = self
                .cache
                .lock()
                .map_err(|_| Error::Internal("embedding cache lock poisoned".to_string()))?;
            for (i, (normalized, key)) in processed.iter().enumerate() {
                match cache.get(key) {
                    Some(vector) => resolved[i] = Some(vector),
                    None => {
                        if !miss_keys.contains(key) {
                            miss_keys.push(key.clone());
                            miss_texts.push(normalized.clone());
                        }
                    }
                }
            }
        }

        let hit_count = resolved.iter().filter(|v| v.is_some()).count();
        debug!(
            cache_hit = hit_count,
            input_count = texts.len(),
            miss_count = miss_texts.len(),
            "Embedding batch resolved against cache"
        );

        if !miss_texts.is_empty() {
            let fresh = self.backend.embed_texts(&miss_texts).await?;
            if fresh.len() != miss_texts.len() {
                return Err(Error::Embedding(format!(
                    "backend returned {} vectors for {} texts",
                    fresh.len(),
                    miss_texts.len()
                )));
            }
            let expected = self.backend.dimension();
            for vector in &fresh {
                if vector.as_slice().len() != expected {
                    return Err(Error::Embedding(format!(
                        "backend returned {}-dimension vector, expected {}",
                        vector.as_slice().len(),
                        expected
                    )));
                }
            }

            let mut cache = self
                .cache
                .lock()
                .map_err(|_| Error::Internal("embedding cache lock poisoned".to_string()))?;
            for (key, vector) in miss_keys.iter().zip(fresh.iter()) {
                cache.insert(key.clone(), vector.clone());
            }
            for (i, (_, key)) in processed.iter().enumerate() {
                if resolved[i].is_none() {
                    resolved[i] = cache.get(key);
                }
            }
        }

        resolved
            .into_iter()
            .map(|v| v.ok_or_else(|| Error::Embedding("batch resolution incomplete".to_string())))
            .collect()
    }
}

#[async_trait]
impl EmbeddingBackend for Embedder {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.embed_batch(texts).await
    }

    fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    async fn health_check(&self) -> Result<bool> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEmbeddingBackend;

    fn embedder_with(mock: MockEmbeddingBackend) -> Embedder {
        Embedder::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_embed_returns_configured_dimension() {
        let embedder = embedder_with(MockEmbeddingBackend::new().with_dimension(64));
        let vector = embedder.embed("some text to embed").await.unwrap();
        assert_eq!(vector.as_slice().len(), 64);
    }

    #[tokio::test]
    async fn test_empty_text_is_invalid_input() {
        let embedder = embedder_with(MockEmbeddingBackend::new());
        for input in ["", "   ", "\n\t"] {
            let err = embedder.embed(input).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "input {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_backend() {
        let mock = MockEmbeddingBackend::new().with_dimension(16);
        let embedder = embedder_with(mock.clone());
        let first = embedder.embed("cache me").await.unwrap();
        let second = embedder.embed("cache me").await.unwrap();
        assert_eq!(first.as_slice(), second.as_slice());
        // One backend call despite two embeds.
        assert_eq!(mock.call_count(), 1);
        assert_eq!(embedder.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_texts_differing_past_a_long_prefix_do_not_collide() {
        let mock = MockEmbeddingBackend::new().with_dimension(16);
        let embedder = embedder_with(mock.clone());
        let prefix = "w ".repeat(150);
        let a = embedder.embed(&format!("{}alpha", prefix)).await.unwrap();
        let b = embedder.embed(&format!("{}beta", prefix)).await.unwrap();
        assert_ne!(a.as_slice(), b.as_slice());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_normalized_duplicates_share_cache_entry() {
        let mock = MockEmbeddingBackend::new().with_dimension(16);
        let embedder = embedder_with(mock.clone());
        embedder.embed("hello   world").await.unwrap();
        embedder.embed("  hello world ").await.unwrap();
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let embedder = embedder_with(MockEmbeddingBackend::new().with_dimension(16));
        let texts = vec![
            "first text".to_string(),
            "second text".to_string(),
            "third text".to_string(),
        ];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        for (text, vector) in texts.iter().zip(&batch) {
            let single = embedder.embed(text).await.unwrap();
            assert_eq!(single.as_slice(), vector.as_slice());
        }
    }

    #[tokio::test]
    async fn test_batch_deduplicates_backend_calls() {
        let mock = MockEmbeddingBackend::new().with_dimension(16);
        let embedder = embedder_with(mock.clone());
        let texts = vec![
            "repeat".to_string(),
            "unique".to_string(),
            "repeat".to_string(),
        ];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].as_slice(), batch[2].as_slice());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_with_empty_member_fails_whole_batch() {
        let embedder = embedder_with(MockEmbeddingBackend::new());
        let texts = vec!["fine".to_string(), " ".to_string()];
        let err = embedder.embed_batch(&texts).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let embedder = embedder_with(MockEmbeddingBackend::new().failing());
        let err = embedder.embed("anything").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_an_error() {
        // Mapping pins a 3-dim vector while the backend claims 16.
        let mock = MockEmbeddingBackend::new()
            .with_dimension(16)
            .with_mapping("short", vec![1.0, 0.0, 0.0]);
        let embedder = embedder_with(mock);
        let err = embedder.embed("short text").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_long_input_truncated_before_backend() {
        let mock = MockEmbeddingBackend::new().with_dimension(16);
        let embedder = embedder_with(mock.clone());
        let long = "word ".repeat(300);
        embedder.embed(&long).await.unwrap();
        let sent = mock.calls();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].chars().count() <= defaults::EMBED_MAX_INPUT_CHARS);
    }

    #[tokio::test]
    async fn test_fifo_eviction_at_capacity() {
        let mock = MockEmbeddingBackend::new().with_dimension(8);
        let embedder = Embedder::with_capacity(Arc::new(mock.clone()), 2);
        embedder.embed("one").await.unwrap();
        embedder.embed("two").await.unwrap();
        embedder.embed("three").await.unwrap();
        assert_eq!(embedder.cached_len(), 2);
        // "one" was evicted; embedding it again hits the backend.
        embedder.embed("one").await.unwrap();
        assert_eq!(mock.call_count(), 4);
    }
}
