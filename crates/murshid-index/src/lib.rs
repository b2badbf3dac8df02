//! Murshid Index: vector index gateway.
//!
//! Nearest-neighbor search over precomputed supervisor/project vectors:
//! - [`VectorIndex`]: the search seam consumed by the recommendation
//!   pipeline (substitutable with fakes in tests)
//! - [`QdrantClient`]: reqwest-based implementation over the Qdrant
//!   `points/query` HTTP API
//!
//! The index itself (collections, upserts, HNSW parameters) is maintained
//! by an offline job and is out of scope here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod qdrant;

pub use error::{Error, Result};
pub use qdrant::{QdrantClient, QdrantConfig};

use async_trait::async_trait;

/// A single nearest-neighbor hit.
#[derive(Debug, Clone)]
pub struct VectorHit {
    /// Point id as stored in the index
    pub id: String,
    /// Similarity score (higher is closer)
    pub score: f32,
    /// Point payload; carries the primary-store join key
    pub payload: serde_json::Value,
}

impl VectorHit {
    /// Resolve the primary-store identifier for this hit.
    ///
    /// Payloads written by the indexing job carry the store id under
    /// `record_id` (older collections used `_id`); as a last resort the
    /// point id itself may be the store id.
    pub fn record_id(&self) -> Option<String> {
        for key in ["record_id", "_id"] {
            if let Some(id) = self.payload.get(key).and_then(|v| v.as_str()) {
                if !id.is_empty() {
                    return Some(id.to_string());
                }
            }
        }
        if self.id.is_empty() {
            None
        } else {
            Some(self.id.clone())
        }
    }
}

/// Trait for nearest-neighbor search backends.
///
/// Implementations must return hits ordered by similarity score descending.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Search `collection` for the `top_k` vectors closest to `vector`.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorHit>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, payload: serde_json::Value) -> VectorHit {
        VectorHit {
            id: id.to_string(),
            score: 0.5,
            payload,
        }
    }

    #[test]
    fn test_record_id_prefers_payload() {
        let h = hit("pt-1", serde_json::json!({"record_id": "64a1b2"}));
        assert_eq!(h.record_id().as_deref(), Some("64a1b2"));

        let h = hit("pt-1", serde_json::json!({"_id": "64ffff"}));
        assert_eq!(h.record_id().as_deref(), Some("64ffff"));
    }

    #[test]
    fn test_record_id_falls_back_to_point_id() {
        let h = hit("64a1b2", serde_json::Value::Null);
        assert_eq!(h.record_id().as_deref(), Some("64a1b2"));
    }

    #[test]
    fn test_record_id_ignores_empty_payload_value() {
        let h = hit("pt-9", serde_json::json!({"record_id": ""}));
        assert_eq!(h.record_id().as_deref(), Some("pt-9"));
    }
}
