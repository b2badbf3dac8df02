//! Murshid Scholar: external publication lookup.
//!
//! Fetches a researcher's recent publications by external author id:
//! - [`PaperLookup`]: the seam consumed by the recommendation pipeline
//! - [`SemanticScholarClient`]: free Semantic Scholar Graph API
//! - [`SerpApiClient`]: Google Scholar via SerpAPI, falling back to
//!   Semantic Scholar when the key is missing or the call fails
//!
//! Lookup failures are reported as errors so they can be logged, but
//! callers are expected to treat them as "no papers"; publication data is
//! best-effort enrichment, never a hard dependency.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod semantic;
pub mod serpapi;

pub use error::{Error, Result};
pub use semantic::SemanticScholarClient;
pub use serpapi::SerpApiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Papers older than this are ignored: the recency scorer would give them
/// a near-zero score anyway, and they bloat the persisted record.
pub const DEFAULT_MIN_YEAR: i32 = 2018;

/// Abstracts are truncated to this many characters before storage.
const MAX_ABSTRACT_CHARS: usize = 300;

/// A single publication, immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paper {
    /// Paper title
    pub title: String,
    /// Publication year
    pub year: i32,
    /// Citation count at fetch time
    #[serde(default)]
    pub citation_count: u32,
    /// Truncated abstract, when the source provides one
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    /// Link to the publication, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Paper {
    /// Create a paper, truncating the abstract to the storage limit.
    pub fn new(
        title: impl Into<String>,
        year: i32,
        citation_count: u32,
        abstract_text: Option<String>,
        link: Option<String>,
    ) -> Self {
        let abstract_text = abstract_text
            .filter(|a| !a.trim().is_empty())
            .map(|a| truncate_chars(&a, MAX_ABSTRACT_CHARS));
        Self {
            title: title.into(),
            year,
            citation_count,
            abstract_text,
            link: link.filter(|l| !l.is_empty()),
        }
    }
}

/// Truncate a string to at most `max` characters (not bytes).
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Trait for publication lookup services.
///
/// Implementations return papers sorted newest-first.
#[async_trait]
pub trait PaperLookup: Send + Sync {
    /// Fetch up to `max_results` recent papers for the given author id.
    async fn papers_by_author(&self, author_id: &str, max_results: usize) -> Result<Vec<Paper>>;
}

/// Sort papers newest-first, in place.
pub(crate) fn sort_newest_first(papers: &mut [Paper]) {
    papers.sort_by(|a, b| b.year.cmp(&a.year));
}
