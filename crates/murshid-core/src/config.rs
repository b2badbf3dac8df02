//! Configuration for the recommendation pipeline.
//!
//! Everything here ships with the tuned production defaults; deployments
//! override via deserialized config files.

use serde::Deserialize;

/// Weights for the scoring regimes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Semantic-similarity weight in the research regime (default 0.5)
    pub semantic: f32,
    /// Supervision-match weight in the research regime (default 0.3)
    pub supervision: f32,
    /// Recency weight in the research regime (default 0.2)
    pub recency: f32,
    /// Semantic weight in the interest/supervision regime (default 0.5)
    pub interest_semantic: f32,
    /// Supervision weight in the interest/supervision regime (default 0.5)
    pub interest_supervision: f32,
    /// Semantic weight in the pure-interest regime (default 0.8)
    pub pure_interest: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.5,
            supervision: 0.3,
            recency: 0.2,
            interest_semantic: 0.5,
            interest_supervision: 0.5,
            pure_interest: 0.8,
        }
    }
}

/// Tunables for the recommendation pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Vector-index collection holding supervisor embeddings
    pub collection: String,
    /// Embedding dimensionality; project embeddings of any other length
    /// are treated as invalid
    pub embedding_dim: usize,
    /// Vector search over-fetch multiplier applied to `top_k`, compensating
    /// for later filtering and unresolvable ids
    pub overfetch_factor: usize,
    /// Maximum papers fetched per supervisor
    pub max_papers: usize,
    /// Candidates scoring at or below this are dropped before re-ranking
    pub score_threshold: f32,
    /// Penalty applied to the general recency score when no paper matches
    /// an idea keyword (empirically tuned, hence configurable)
    pub general_recency_factor: f32,
    /// Shortlist slots reserved for same-major candidates
    pub same_major_quota: usize,
    /// Shortlist slots reserved for cross-major candidates
    pub cross_major_quota: usize,
    /// Scoring weights
    pub weights: ScoringWeights,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            collection: "supervisors".to_string(),
            embedding_dim: 768,
            overfetch_factor: 4,
            max_papers: 15,
            score_threshold: 0.15,
            general_recency_factor: 0.5,
            same_major_quota: 3,
            cross_major_quota: 2,
            weights: ScoringWeights::default(),
        }
    }
}
