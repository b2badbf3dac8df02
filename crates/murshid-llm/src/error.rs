//! Error types for LLM and embedding clients.

use thiserror::Error;

/// Error type for Gemini reasoning and embedding operations
#[derive(Error, Debug)]
pub enum Error {
    /// Network / transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The API returned a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Sanitized error message from the API
        message: String,
    },

    /// The API returned a body we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing API key or other required configuration
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for failures that are worth one more attempt (transport errors
    /// and 5xx / 429 responses).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Network("timeout".into()).is_transient());
        assert!(Error::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient());
        assert!(Error::Api {
            status: 429,
            message: "rate limit".into()
        }
        .is_transient());
        assert!(!Error::Api {
            status: 400,
            message: "bad request".into()
        }
        .is_transient());
        assert!(!Error::NotConfigured("no key".into()).is_transient());
    }
}
