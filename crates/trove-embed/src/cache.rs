//! Bounded FIFO cache for embedding vectors.
//!
//! Keyed by a content hash of the full preprocessed text, so two texts that
//! share a long prefix never collide. Eviction is insertion-order FIFO, not
//! LRU: embeddings are deterministic per model, so recomputing an evicted
//! entry costs latency but never correctness.

use std::collections::{HashMap, VecDeque};

use trove_core::Vector;

/// Cache key for a text: blake3 hash of the full content, hex-encoded.
pub fn cache_key(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// A bounded map from cache keys to embedding vectors.
///
/// Not synchronized; [`crate::Embedder`] wraps it in a mutex and keeps every
/// lock hold short and awaitless.
#[derive(Debug)]
pub struct EmbeddingCache {
    entries: HashMap<String, Vector>,
    order: VecDeque<String>,
    capacity: usize,
}

impl EmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<Vector> {
        self.entries.get(key).cloned()
    }

    /// Insert a vector, evicting oldest-inserted entries once the capacity
    /// is exceeded. Re-inserting an existing key replaces the value but
    /// keeps its original position in the eviction order.
    pub fn insert(&mut self, key: String, vector: Vector) {
        if self.entries.insert(key.clone(), vector).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
