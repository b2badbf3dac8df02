//! Qdrant HTTP client for nearest-neighbor search.
//!
//! Talks to the `points/query` endpoint of a (typically cloud-hosted)
//! Qdrant instance. Supervisor vectors are precomputed and upserted by an
//! offline indexing job; this client only searches.

use crate::error::{Error, Result};
use crate::{VectorHit, VectorIndex};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    points: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: serde_json::Value,
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

/// Configuration for [`QdrantClient`].
#[derive(Clone)]
pub struct QdrantConfig {
    /// Base URL, e.g. `https://xyz.cloud.qdrant.io:6333`
    pub url: String,
    /// Optional API key (sent as the `api-key` header)
    pub api_key: Option<String>,
    /// Request timeout. Cloud instances can be slow on cold collections,
    /// so the default is generous (60 s).
    pub timeout: Duration,
}

impl fmt::Debug for QdrantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QdrantConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl QdrantConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Qdrant nearest-neighbor search client.
pub struct QdrantClient {
    client: Client,
    config: QdrantConfig,
}

impl QdrantClient {
    /// Create a new client.
    pub fn new(config: QdrantConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.without_url().to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl VectorIndex for QdrantClient {
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorHit>> {
        let url = format!(
            "{}/collections/{}/points/query",
            self.config.url.trim_end_matches('/'),
            collection
        );

        let mut request = self.client.post(&url).json(&QueryRequest {
            query: vector,
            limit: top_k,
            with_payload: true,
        });
        if let Some(key) = &self.config.api_key {
            request = request.header("api-key", key);
        }

        let response = request
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

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("malformed query body: {e}")))?;

        let hits: Vec<VectorHit> = parsed
            .result
            .points
            .into_iter()
            .map(|p| VectorHit {
                // Point ids may be integers or strings; normalize to string.
                id: match p.id {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                },
                score: p.score,
                payload: p.payload.unwrap_or(serde_json::Value::Null),
            })
            .collect();

        debug!(collection, hits = hits.len(), "Vector search complete");
        Ok(hits)
    }
}
