//! Supervisor recommendation engine.
//!
//! Turns a student's free-text project idea into a ranked list of
//! recommended supervisors. One request flows through a fixed pipeline:
//!
//! 1. Embed the idea text.
//! 2. Nearest-neighbor search over supervisor embeddings, over-fetching
//!    to survive later filtering.
//! 3. Hydrate hits into full supervisor records from the primary store.
//! 4. Enrich candidates concurrently: refresh recent papers (with
//!    write-back) and score supervision history against the idea.
//! 5. Weighted scoring with per-candidate evidence regimes.
//! 6. Quota selection balancing same-major and cross-major candidates.
//! 7. Best-effort re-rank with natural-language justifications.
//!
//! [`orchestrator::Recommender`] drives the pipeline; every external
//! system sits behind a trait so the whole thing runs hermetically in
//! tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod department;
pub mod error;
pub mod orchestrator;
pub mod recency;
pub mod rerank;
pub mod scoring;
pub mod similarity;
pub mod store;
pub mod supervision;
pub mod types;

pub use config::{RecommenderConfig, ScoringWeights};
pub use error::{Error, Result};
pub use orchestrator::Recommender;
pub use store::{MemoryStore, SharedStore, SupervisorStore};
pub use types::{
    BestMatchedProject, Candidate, Idea, Recommendation, RecommendationRequest, RerankOutcome,
    SupervisedProject, SupervisorRecord,
};
