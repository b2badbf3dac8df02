//! Google Scholar lookup via SerpAPI, with Semantic Scholar fallback.
//!
//! SerpAPI's `google_scholar_author` engine gives fresher citation data but
//! needs a paid key; when the key is absent or the call fails we fall back
//! to the free Semantic Scholar client so the pipeline always has a lookup
//! path.

use crate::error::{Error, Result};
use crate::{sort_newest_first, Paper, PaperLookup, SemanticScholarClient, DEFAULT_MIN_YEAR};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

const BASE_URL: &str = "https://serpapi.com/search";

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
    /// SerpAPI returns the year as a string
    #[serde(default)]
    year: Option<serde_json::Value>,
    #[serde(default)]
    cited_by: Option<CitedBy>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CitedBy {
    #[serde(default)]
    value: Option<serde_json::Value>,
}

/// Lenient integer extraction: accepts numbers and numeric strings, treats
/// everything else as absent.
fn lenient_int(value: Option<&serde_json::Value>) -> Option<i64> {
    match value? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Google Scholar publication lookup with automatic fallback.
pub struct SerpApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    min_year: i32,
    fallback: SemanticScholarClient,
}

impl fmt::Debug for SerpApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerpApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("min_year", &self.min_year)
            .finish()
    }
}

impl SerpApiClient {
    /// Create a new client. A `None` key means every lookup goes straight
    /// to the Semantic Scholar fallback.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| Error::Network(e.without_url().to_string()))?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            min_year: DEFAULT_MIN_YEAR,
            fallback: SemanticScholarClient::new()?,
        })
    }

    /// Create from the `SERP_API_KEY` environment variable (optional).
    pub fn from_env() -> Result<Self> {
        Self::new(std::env::var("SERP_API_KEY").ok())
    }

    /// Override the base URL (tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn lookup_serpapi(&self, author_id: &str, max_results: usize) -> Result<Vec<Paper>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::InvalidResponse("SERP_API_KEY not configured".to_string()))?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("engine", "google_scholar_author"),
                ("author_id", author_id),
                ("api_key", api_key),
                ("num", &max_results.to_string()),
                ("sort", "pubdate"),
            ])
            .send()
            .await
            .map_err(|e| Error::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: "google_scholar_author request failed".to_string(),
            });
        }

        let parsed: SerpResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("malformed articles body: {e}")))?;

        let mut papers: Vec<Paper> = parsed
            .articles
            .into_iter()
            .filter_map(|a| {
                let year = lenient_int(a.year.as_ref())? as i32;
                if year < self.min_year {
                    return None;
                }
                let citations = a
                    .cited_by
                    .as_ref()
                    .and_then(|c| lenient_int(c.value.as_ref()))
                    .unwrap_or(0)
                    .max(0) as u32;
                Some(Paper::new(
                    a.title.unwrap_or_else(|| "Untitled".to_string()),
                    year,
                    citations,
                    None,
                    a.link,
                ))
            })
            .collect();

        sort_newest_first(&mut papers);
        Ok(papers)
    }
}

#[async_trait]
impl PaperLookup for SerpApiClient {
    async fn papers_by_author(&self, author_id: &str, max_results: usize) -> Result<Vec<Paper>> {
        let author_id = author_id.trim();
        if author_id.is_empty() {
            return Ok(Vec::new());
        }

        if self.api_key.is_some() {
            match self.lookup_serpapi(author_id, max_results).await {
                Ok(papers) if !papers.is_empty() => {
                    debug!(author_id, papers = papers.len(), "SerpAPI lookup complete");
                    return Ok(papers);
                }
                Ok(_) => debug!(author_id, "SerpAPI returned no articles, trying fallback"),
                Err(e) => warn!(author_id, error = %e, "SerpAPI lookup failed, trying fallback"),
            }
        }

        self.fallback.papers_by_author(author_id, max_results).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_int() {
        assert_eq!(lenient_int(Some(&serde_json::json!(2024))), Some(2024));
        assert_eq!(lenient_int(Some(&serde_json::json!("2023"))), Some(2023));
        assert_eq!(lenient_int(Some(&serde_json::json!(" 17 "))), Some(17));
        assert_eq!(lenient_int(Some(&serde_json::json!("n/a"))), None);
        assert_eq!(lenient_int(None), None);
    }

    #[test]
    fn test_serp_response_parsing() {
        let body = r#"{
            "articles": [
                {"title": "A", "year": "2024", "cited_by": {"value": 31}, "link": "https://x"},
                {"title": "B", "year": 2020}
            ]
        }"#;
        let parsed: SerpResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.articles.len(), 2);
        assert_eq!(
            lenient_int(parsed.articles[0].year.as_ref()),
            Some(2024)
        );
    }

    #[tokio::test]
    async fn test_blank_author_id_returns_empty() {
        let client = SerpApiClient::new(None).unwrap();
        let papers = client.papers_by_author("", 10).await.unwrap();
        assert!(papers.is_empty());
    }
}
