//! Error types for publication lookup.

use thiserror::Error;

/// Error type for external paper lookups
#[derive(Error, Debug)]
pub enum Error {
    /// Network / transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The lookup service returned a non-success status
    #[error("Lookup error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// The service returned a body we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;
