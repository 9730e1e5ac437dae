//! # trove-embed
//!
//! Embedding generation for trove: text preprocessing, a bounded
//! content-addressed cache, and pluggable backends behind the
//! [`trove_core::EmbeddingBackend`] trait.
//!
//! The main entry point is [`Embedder`], which wraps any backend with
//! validation, preprocessing, and caching, and is itself a backend so the
//! rest of the pipeline never needs to know whether caching sits in front.

pub mod cache;
pub mod config;
pub mod embedder;
pub mod http;
pub mod preprocess;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use cache::{cache_key, EmbeddingCache};
pub use config::EmbedConfig;
pub use embedder::Embedder;
pub use http::HttpEmbeddingBackend;
