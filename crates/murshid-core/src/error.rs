//! Error types for the recommendation engine.

use thiserror::Error;

/// Errors that can escape the recommendation pipeline.
///
/// Most collaborator failures are absorbed inside the pipeline (they
/// degrade a single candidate or short-circuit to an empty result); the
/// variants here cover the one fatal stage (hydration from the primary
/// store) and programming errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Primary-store failure during hydration, the only stage allowed to
    /// fail the whole request
    #[error("store error: {0}")]
    Store(String),

    /// Embedding gateway failure
    #[error("embedding error: {0}")]
    Embedding(#[from] murshid_llm::Error),

    /// Vector index failure
    #[error("index error: {0}")]
    Index(#[from] murshid_index::Error),

    /// General internal error
    #[error("{0}")]
    Internal(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;
