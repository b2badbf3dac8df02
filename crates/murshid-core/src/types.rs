//! Core data types for the recommendation pipeline.
//!
//! The pipeline turns a free-text project **idea** into a ranked list of
//! supervisor **candidates**. A candidate starts as a persisted
//! [`SupervisorRecord`] joined with a vector-index hit and is enriched
//! in place as it moves through the stages; nothing here is persisted
//! except the write-back of refreshed papers.

use murshid_scholar::Paper;
use serde::{Deserialize, Serialize};

/// A student's project idea, ephemeral for the duration of one request.
#[derive(Debug, Clone)]
pub struct Idea {
    /// Free-text description of the idea
    pub text: String,
    /// Extracted keywords, most significant first
    pub keywords: Vec<String>,
    /// Embedding of `text` (fixed length, typically 768)
    pub embedding: Vec<f32>,
}

/// A supervisor as persisted in the primary store.
///
/// Field names and casing are normalized here, at the hydration boundary;
/// downstream stages never see raw store documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorRecord {
    /// Stable, unique store identifier
    pub id: String,
    /// Display name (join key for historically supervised projects)
    pub name: String,
    /// Academic department
    pub department: String,
    /// Google Scholar author id, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// ORCID id, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid_id: Option<String>,
    /// Cached recent publications (write-through from the paper lookup)
    #[serde(default)]
    pub recent_papers: Vec<Paper>,
    /// Date of the most recent known activity, `YYYY-MM-DD` or bare year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl SupervisorRecord {
    /// External author identifier used for paper lookup: Scholar id when
    /// present, otherwise ORCID.
    pub fn external_author_id(&self) -> Option<&str> {
        self.author_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.orcid_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            })
    }
}

/// The single most similar project a supervisor has previously supervised.
///
/// Supporting evidence for the justification text only; it never feeds the
/// supervision-match score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestMatchedProject {
    /// Project title
    pub title: String,
    /// Project keywords
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Cosine similarity to the idea, in [0,1]
    pub match_score: f32,
}

/// A historical graduation project with its precomputed embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisedProject {
    /// Project title
    pub title: String,
    /// Project keywords
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Display names of the supervisors of record
    #[serde(default)]
    pub supervisors: Vec<String>,
    /// Precomputed embedding of the project description
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// A supervisor under consideration for an idea, carrying computed scores.
///
/// Mutated progressively by the pipeline stages; never touched by two
/// stages concurrently.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The hydrated supervisor record
    pub record: SupervisorRecord,
    /// Stable shortlist index, assigned at quota selection
    pub index: usize,
    /// Similarity score from the vector index, clamped to [0,1]
    pub semantic_similarity: f32,
    /// Mean similarity to historically supervised projects, in [0,1]
    pub supervision_match_score: f32,
    /// Decayed freshness score, in [0,1]
    pub recency_score: f32,
    /// Combined weighted score, in [0,1]
    pub final_score: f32,
    /// Whether the supervisor's department matches the student's major
    pub is_same_major: bool,
    /// Idea keywords found in the candidate's recent papers
    pub matched_keywords: Vec<String>,
    /// Titles of keyword-matching papers (at most 3), for the justification
    pub top_matched_papers: Vec<String>,
    /// Best-matching historical project, for the justification
    pub best_matched_project: Option<BestMatchedProject>,
    /// Natural-language recommendation rationale
    pub justification: Option<String>,
}

impl Candidate {
    /// Create a candidate from a hydrated record and its vector-index score.
    pub fn new(record: SupervisorRecord, semantic_similarity: f32) -> Self {
        Self {
            record,
            index: 0,
            semantic_similarity: semantic_similarity.clamp(0.0, 1.0),
            supervision_match_score: 0.0,
            recency_score: 0.0,
            final_score: 0.0,
            is_same_major: false,
            matched_keywords: Vec::new(),
            top_matched_papers: Vec::new(),
            best_matched_project: None,
            justification: None,
        }
    }
}

/// Outcome of the re-ranking stage.
///
/// The reasoning service is best-effort: both arms carry the full candidate
/// set, the tag records which path produced the order.
#[derive(Debug)]
pub enum RerankOutcome {
    /// The reasoning service reordered and explained the shortlist
    Reranked(Vec<Candidate>),
    /// The local order was kept; `reason` says why
    Fallback {
        /// Candidates in locally computed order, with synthetic justifications
        candidates: Vec<Candidate>,
        /// Why the re-ranked output was discarded
        reason: String,
    },
}

impl RerankOutcome {
    /// Borrow the candidate list regardless of path.
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            Self::Reranked(c) => c,
            Self::Fallback { candidates, .. } => candidates,
        }
    }

    /// Consume into the candidate list.
    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Self::Reranked(c) => c,
            Self::Fallback { candidates, .. } => candidates,
        }
    }

    /// True if the local order was kept.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// A recommendation request, as received from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    /// Free-text idea description
    pub idea_text: String,
    /// Idea keywords (may include compound phrases)
    #[serde(default)]
    pub keywords: Vec<String>,
    /// The student's declared major
    pub student_major: String,
    /// Maximum number of supervisors to return
    pub top_k: usize,
}

/// The final ranked recommendation.
#[derive(Debug)]
pub struct Recommendation {
    /// Ranked candidates, best first, at most `top_k`
    pub candidates: Vec<Candidate>,
    /// True when the order came from the reasoning service, false when the
    /// locally computed order was kept
    pub reranked: bool,
}
