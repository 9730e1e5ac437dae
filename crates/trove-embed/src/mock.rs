//! Mock embedding backend for deterministic testing.
//!
//! Generates reproducible vectors from text content, supports pinning exact
//! vectors for selected inputs (to construct known similarities), and can
//! inject failures for error-path tests. No randomness: the same test input
//! always produces the same outcome.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use trove_core::{defaults, EmbeddingBackend, Error, Result, Vector};

/// Generate a deterministic embedding from text.
///
/// Character-based hashing: the same text always produces the same unit
/// vector, and different texts almost always differ.
pub fn deterministic_vector(text: &str, dimension: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dimension];
    for (i, c) in text.chars().enumerate() {
        let idx = (c as usize + i) % dimension;
        vec[idx] += 0.1;
    }
    normalize(&mut vec);
    vec
}

/// Normalize a vector to unit length in place. Zero vectors are left as-is.
pub fn normalize(vec: &mut [f32]) {
    let magnitude: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for v in vec.iter_mut() {
            *v /= magnitude;
        }
    }
}

#[derive(Debug, Clone)]
struct MockConfig {
    dimension: usize,
    model: String,
    /// Inputs containing a key return the pinned vector instead of the
    /// hashed one. First match wins.
    mappings: Vec<(String, Vec<f32>)>,
    /// Fail any batch where an input contains this substring.
    fail_on: Option<String>,
    /// Fail every call.
    fail_all: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dimension: defaults::EMBED_DIMENSION,
            model: "mock-embed".to_string(),
            mappings: Vec::new(),
            fail_on: None,
            fail_all: false,
        }
    }
}

/// Mock embedding backend for tests.
#[derive(Debug, Clone, Default)]
pub struct MockEmbeddingBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<String>>>,
}

impl MockEmbeddingBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Set the reported model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model = model.into();
        self
    }

    /// Pin an exact vector for inputs containing `key`.
    pub fn with_mapping(mut self, key: impl Into<String>, vector: Vec<f32>) -> Self {
        Arc::make_mut(&mut self.config)
            .mappings
            .push((key.into(), vector));
        self
    }

    /// Fail any batch containing an input with this substring.
    pub fn with_failure_on(mut self, key: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).fail_on = Some(key.into());
        self
    }

    /// Fail every call.
    pub fn failing(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail_all = true;
        self
    }

    /// All texts passed to `embed_texts`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Number of texts embedded across all calls.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        for (key, vector) in &self.config.mappings {
            if text.contains(key.as_str()) {
                return vector.clone();
            }
        }
        deterministic_vector(text, self.config.dimension)
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if let Ok(mut log) = self.call_log.lock() {
            log.extend(texts.iter().cloned());
        }

        if self.config.fail_all {
            return Err(Error::Embedding("simulated embedding failure".to_string()));
        }
        if let Some(ref needle) = self.config.fail_on {
            if texts.iter().any(|t| t.contains(needle.as_str())) {
                return Err(Error::Embedding(format!(
                    "simulated embedding failure on input containing {:?}",
                    needle
                )));
            }
        }

        Ok(texts
            .iter()
            .map(|t| Vector::from(self.vector_for(t)))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.config.fail_all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_output() {
        let backend = MockEmbeddingBackend::new().with_dimension(16);
        let a = backend.embed_texts(&["hello".to_string()]).await.unwrap();
        let b = backend.embed_texts(&["hello".to_string()]).await.unwrap();
        assert_eq!(a[0].as_slice(), b[0].as_slice());
    }

    #[tokio::test]
    async fn test_dimension_respected() {
        let backend = MockEmbeddingBackend::new().with_dimension(32);
        let out = backend.embed_texts(&["text".to_string()]).await.unwrap();
        assert_eq!(out[0].as_slice().len(), 32);
        assert_eq!(backend.dimension(), 32);
    }

    #[test]
    fn test_vectors_are_normalized() {
        let v = deterministic_vector("some text", 64);
        let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_mapping_overrides_hash() {
        let backend = MockEmbeddingBackend::new()
            .with_dimension(3)
            .with_mapping("pinned", vec![1.0, 0.0, 0.0]);
        let out = backend
            .embed_texts(&["text with pinned phrase".to_string()])
            .await
            .unwrap();
        assert_eq!(out[0].as_slice(), &[1.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let backend = MockEmbeddingBackend::new().with_failure_on("poison");
        let ok = backend.embed_texts(&["fine".to_string()]).await;
        assert!(ok.is_ok());
        let err = backend
            .embed_texts(&["contains poison here".to_string()])
            .await;
        assert!(matches!(err, Err(Error::Embedding(_))));
    }

    #[tokio::test]
    async fn test_call_log() {
        let backend = MockEmbeddingBackend::new();
        backend
            .embed_texts(&["one".to_string(), "two".to_string()])
            .await
            .unwrap();
        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.calls(), vec!["one".to_string(), "two".to_string()]);
    }
}
