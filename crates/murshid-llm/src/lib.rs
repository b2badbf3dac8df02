//! Murshid LLM: Gemini reasoning and embedding clients.
//!
//! Two thin gateways over the Gemini REST API:
//! - [`Reasoner`] / [`GeminiClient`]: JSON-mode text generation, used by the
//!   re-ranking and explanation stage.
//! - [`EmbeddingProvider`] / [`GeminiEmbedding`]: text → 768-dim vector,
//!   used for idea/project semantic similarity.
//!
//! Both carry explicit timeouts and a bounded retry on transient failures;
//! neither is a hard dependency of the recommendation pipeline; callers
//! degrade gracefully when these services fail.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod embeddings;
pub mod error;
pub mod gemini;

pub use embeddings::{
    EmbeddingProvider, GeminiEmbedding, GeminiEmbeddingConfig, SharedEmbeddingProvider,
    DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL,
};
pub use error::{Error, Result};
pub use gemini::{GeminiClient, GeminiConfig, Reasoner, DEFAULT_MODEL};
