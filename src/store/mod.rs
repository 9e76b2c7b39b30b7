// Vector store module
// Typed records exchanged with the Qdrant collection and the REST adapter


pub mod qdrant;

pub use qdrant::QdrantStore;

use serde::{Deserialize, Serialize};

/// Payload persisted alongside each vector.
///
/// This is a closed record, not an open-ended map: the store boundary only
/// accepts and returns these two fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PointPayload {
    /// Identifier of the source document the chunk came from.
    pub source: String,
    /// The chunk text itself.
    pub text: String,
}

/// The persisted unit in the vector index: a deterministic ID, the embedding
/// vector, and the payload. Owned exclusively by the store adapter; upserting
/// a point whose ID already exists fully replaces vector and payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

/// One result of a similarity query, best match first. Transient: exists only
/// within a single query invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub source_id: String,
    pub score: f32,
}
