//! OpenAI-compatible HTTP embedding backend with bounded retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use trove_core::{truncate_chars, EmbeddingBackend, Error, Result, Vector};

use crate::config::EmbedConfig;

/// Request body for the embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

/// Response from the embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// Single embedding data point.
#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// One attempt's failure, classified for the retry decision.
#[derive(Debug)]
enum AttemptError {
    /// Connection or timeout failure before a response arrived.
    Transport(reqwest::Error),
    /// Non-success HTTP status with response body.
    Status(reqwest::StatusCode, String),
    /// The response arrived but did not parse as an embedding payload.
    Decode(String),
}

impl AttemptError {
    /// Transient failures are retried: network timeouts and connection
    /// errors, 5xx, and 429. Other 4xx and malformed payloads are
    /// deterministic and fail immediately.
    fn is_retriable(&self) -> bool {
        match self {
            AttemptError::Transport(e) => e.is_timeout() || e.is_connect(),
            AttemptError::Status(status, _) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            AttemptError::Decode(_) => false,
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Transport(e) => write!(f, "request failed: {}", e),
            AttemptError::Status(status, body) => {
                write!(f, "embedding API returned {}: {}", status, body)
            }
            AttemptError::Decode(msg) => write!(f, "invalid embedding response: {}", msg),
        }
    }
}

/// Embedding backend speaking the OpenAI `/v1/embeddings` wire protocol.
pub struct HttpEmbeddingBackend {
    client: Client,
    config: EmbedConfig,
}

impl HttpEmbeddingBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: EmbedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "embed",
            component = "http",
            model = %config.model,
            base_url = %config.base_url,
            "Initializing embedding backend"
        );

        Ok(Self { client, config })
    }

    /// Create from `TROVE_EMBED_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(EmbedConfig::from_env())
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/embeddings",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn attempt(&self, request: &EmbeddingRequest) -> std::result::Result<Vec<Vector>, AttemptError> {
        let mut req = self.client.post(self.endpoint());
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Status(status, body));
        }

        let payload: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Decode(e.to_string()))?;

        if payload.data.len() != request.input.len() {
            return Err(AttemptError::Decode(format!(
                "expected {} embeddings, got {}",
                request.input.len(),
                payload.data.len()
            )));
        }
        if let Some(bad) = payload
            .data
            .iter()
            .find(|d| d.embedding.len() != self.config.dimension)
        {
            return Err(AttemptError::Decode(format!(
                "expected dimension {}, got {}",
                self.config.dimension,
                bad.embedding.len()
            )));
        }

        // Sort by index to ensure correct ordering
        let mut data = payload.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| Vector::from(d.embedding)).collect())
    }

    /// Run one request with bounded retry and exponential backoff.
    async fn request_with_retry(&self, request: &EmbeddingRequest) -> Result<Vec<Vector>> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(request).await {
                Ok(vectors) => return Ok(vectors),
                Err(err) => {
                    if attempt >= max_attempts || !err.is_retriable() {
                        return Err(Error::Embedding(err.to_string()));
                    }
                    let delay = Duration::from_millis(
                        self.config.retry_base_delay_ms.saturating_mul(1 << (attempt - 1)),
                    );
                    warn!(
                        subsystem = "embed",
                        component = "http",
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retriable embedding failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl EmbeddingBackend for HttpEmbeddingBackend {
    #[instrument(skip(self, texts), fields(subsystem = "embed", component = "http", op = "embed_texts", model = %self.config.model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();

        // Wire-level clamp for callers that skip preprocessing.
        let input: Vec<String> = texts
            .iter()
            .map(|t| truncate_chars(t, self.config.remote_max_input_chars).to_string())
            .collect();

        let request = EmbeddingRequest {
            model: self.config.model.clone(),
            input,
        };

        let vectors = self.request_with_retry(&request).await?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            result_count = vectors.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > 5000 {
            warn!(
                duration_ms = elapsed,
                input_count = texts.len(),
                slow = true,
                "Slow embedding operation"
            );
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/v1/models", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    debug!(
                        subsystem = "embed",
                        component = "http",
                        "Embedding backend health check passed"
                    );
                    Ok(true)
                } else {
                    warn!(
                        subsystem = "embed",
                        component = "http",
                        status = %resp.status(),
                        "Embedding backend health check failed"
                    );
                    Ok(false)
                }
            }
            Err(e) => {
                warn!(
                    subsystem = "embed",
                    component = "http",
                    error = %e,
                    "Embedding backend health check error"
                );
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_classification() {
        let err = AttemptError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, String::new());
        assert!(err.is_retriable());
        let err = AttemptError::Status(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(err.is_retriable());
        let err = AttemptError::Status(reqwest::StatusCode::BAD_REQUEST, String::new());
        assert!(!err.is_retriable());
        let err = AttemptError::Decode("truncated".to_string());
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let backend = HttpEmbeddingBackend::new(EmbedConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..EmbedConfig::default()
        })
        .unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8080/v1/embeddings");
    }
}
