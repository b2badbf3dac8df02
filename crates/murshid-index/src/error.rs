//! Error types for the vector index gateway.

use thiserror::Error;

/// Error type for nearest-neighbor search operations
#[derive(Error, Debug)]
pub enum Error {
    /// Network / transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The index returned a non-success status
    #[error("Index error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the index
        message: String,
    },

    /// The index returned a body we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;
