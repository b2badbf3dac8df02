//! Embedding providers for vector search.
//!
//! - `EmbeddingProvider` trait for abstraction
//! - `GeminiEmbedding` calling the Gemini `embedContent` endpoint
//!
//! Empty or whitespace-only input yields the **zero vector** of the
//! provider's dimensionality. That is a "no information" sentinel, not an
//! error; downstream consumers decide how to treat it.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Dimensionality of the default embedding model
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Trait for embedding providers
///
/// Embedding providers convert text into dense vector representations
/// suitable for semantic similarity search. Output must be deterministic
/// for identical input within a session.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimension
    fn dimensions(&self) -> usize;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Wrapper for thread-safe embedding provider access
pub type SharedEmbeddingProvider = Arc<dyn EmbeddingProvider>;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    content: EmbedContent<'a>,
}

#[derive(Debug, Serialize)]
struct EmbedContent<'a> {
    parts: Vec<EmbedPart<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

// ============================================================================
// Gemini embedding client
// ============================================================================

/// Configuration for [`GeminiEmbedding`].
#[derive(Clone)]
pub struct GeminiEmbeddingConfig {
    /// API key
    pub api_key: String,
    /// Base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Expected output dimensionality
    pub dimensions: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for GeminiEmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiEmbeddingConfig")
            .field("api_key", &"****")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiEmbeddingConfig {
    /// Create a new configuration with an API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIM,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model and its dimensionality
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

/// Embedding provider backed by the Gemini `embedContent` endpoint.
pub struct GeminiEmbedding {
    client: Client,
    config: GeminiEmbeddingConfig,
}

impl GeminiEmbedding {
    /// Create a new Gemini embedding provider.
    pub fn new(config: GeminiEmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.without_url().to_string()))?;
        Ok(Self { client, config })
    }

    /// Create from `GEMINI_API_KEY` or `GOOGLE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| {
                Error::NotConfigured("GEMINI_API_KEY or GOOGLE_API_KEY not set".to_string())
            })?;
        Self::new(GeminiEmbeddingConfig::new(api_key))
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.config.dimensions]);
        }

        let url = format!(
            "{}/models/{}:embedContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );

        let request = EmbedRequest {
            content: EmbedContent {
                parts: vec![EmbedPart { text }],
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("malformed embedContent body: {e}")))?;

        let values = parsed.embedding.values;
        if values.len() != self.config.dimensions {
            return Err(Error::InvalidResponse(format!(
                "unexpected embedding length: got {}, expected {}",
                values.len(),
                self.config.dimensions
            )));
        }

        debug!(model = %self.config.model, dims = values.len(), "Generated embedding");
        Ok(values)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_input_yields_zero_vector() {
        let provider =
            GeminiEmbedding::new(GeminiEmbeddingConfig::new("test-key")).unwrap();
        let embedding = provider.embed("   ").await.unwrap();
        assert_eq!(embedding.len(), DEFAULT_EMBEDDING_DIM);
        assert!(embedding.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_config_debug_masks_key() {
        let config = GeminiEmbeddingConfig::new("very-secret-key");
        assert!(!format!("{:?}", config).contains("very-secret-key"));
    }

    #[test]
    fn test_embed_response_parsing() {
        let body = r#"{"embedding": {"values": [0.1, -0.2, 0.3]}}"#;
        let parsed: EmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.embedding.values, vec![0.1, -0.2, 0.3]);
    }
}
