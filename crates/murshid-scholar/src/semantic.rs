//! Semantic Scholar Graph API client.
//!
//! Free, keyless endpoint: `GET /graph/v1/author/{id}/papers`.

use crate::error::{Error, Result};
use crate::{sort_newest_first, Paper, PaperLookup, DEFAULT_MIN_YEAR};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";
const FIELDS: &str = "title,year,citationCount,abstract";

#[derive(Debug, Deserialize)]
struct PapersResponse {
    #[serde(default)]
    data: Vec<ApiPaper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPaper {
    #[serde(default)]
    title: Option<String>,
    /// Year can be null for in-press papers
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    citation_count: Option<u32>,
    #[serde(default)]
    r#abstract: Option<String>,
}

/// Semantic Scholar publication lookup.
pub struct SemanticScholarClient {
    client: Client,
    base_url: String,
    min_year: i32,
}

impl SemanticScholarClient {
    /// Create a new client with default settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("murshid-recommendation-engine")
            .build()
            .map_err(|e| Error::Network(e.without_url().to_string()))?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            min_year: DEFAULT_MIN_YEAR,
        })
    }

    /// Override the base URL (tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the minimum publication year.
    #[must_use]
    pub fn with_min_year(mut self, min_year: i32) -> Self {
        self.min_year = min_year;
        self
    }
}

#[async_trait]
impl PaperLookup for SemanticScholarClient {
    async fn papers_by_author(&self, author_id: &str, max_results: usize) -> Result<Vec<Paper>> {
        let author_id = author_id.trim();
        if author_id.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/author/{}/papers", self.base_url, author_id);
        let response = self
            .client
            .get(&url)
            .query(&[("fields", FIELDS), ("limit", &max_results.to_string())])
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

        let parsed: PapersResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("malformed papers body: {e}")))?;

        let mut papers: Vec<Paper> = parsed
            .data
            .into_iter()
            .filter_map(|p| {
                let year = p.year.unwrap_or(0);
                if year < self.min_year {
                    return None;
                }
                Some(Paper::new(
                    p.title.unwrap_or_else(|| "Untitled".to_string()),
                    year,
                    p.citation_count.unwrap_or(0),
                    p.r#abstract,
                    None,
                ))
            })
            .collect();

        sort_newest_first(&mut papers);
        debug!(author_id, papers = papers.len(), "Semantic Scholar lookup complete");
        Ok(papers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_papers_response_tolerates_nulls() {
        let body = r#"{
            "data": [
                {"title": "A", "year": 2024, "citationCount": 12, "abstract": "text"},
                {"title": null, "year": null, "citationCount": null}
            ]
        }"#;
        let parsed: PapersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].year, Some(2024));
        assert!(parsed.data[1].year.is_none());
    }

    #[tokio::test]
    async fn test_blank_author_id_returns_empty() {
        let client = SemanticScholarClient::new().unwrap();
        let papers = client.papers_by_author("  ", 10).await.unwrap();
        assert!(papers.is_empty());
    }
}
