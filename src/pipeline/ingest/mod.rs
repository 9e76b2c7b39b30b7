
use tracing::{info, warn};

use super::IngestOutcome;
use crate::identity::chunk_id;
use crate::openai::EmbeddingClient;
use crate::store::{PointPayload, QdrantStore};
use crate::{RagError, Result};

/// One idempotent "ingest document" operation: embed every chunk in a single
/// batch, derive deterministic point IDs from `(source_id, position)`, and
/// upsert the whole document at once.
///
/// Re-running with identical input rewrites the same points, so storage ends
/// in the same state as a single run. Re-running with fewer chunks leaves the
/// earlier run's trailing points in place; nothing here garbage-collects
/// them.
pub struct IngestPipeline {
    embeddings: EmbeddingClient,
    store: QdrantStore,
}

impl IngestPipeline {
    #[inline]
    pub fn new(embeddings: EmbeddingClient, store: QdrantStore) -> Self {
        Self { embeddings, store }
    }

    #[inline]
    pub fn ingest(&self, source_id: &str, chunks: &[String]) -> Result<IngestOutcome> {
        if chunks.is_empty() {
            return Err(RagError::EmptyInput);
        }

        if let Some(position) = chunks.iter().position(|chunk| chunk.trim().is_empty()) {
            warn!(
                "Rejecting ingestion of '{}': chunk at position {} is blank",
                source_id, position
            );
            return Err(RagError::EmptyInput);
        }

        info!("Ingesting {} chunks from '{}'", chunks.len(), source_id);

        // All embeddings complete before any point is written; a failure
        // here leaves the collection untouched.
        let vectors = self.embeddings.embed_batch(chunks)?;

        let ids: Vec<String> = (0..chunks.len())
            .map(|position| chunk_id(source_id, position))
            .collect();
        let payloads: Vec<PointPayload> = chunks
            .iter()
            .map(|text| PointPayload {
                source: source_id.to_string(),
                text: text.clone(),
            })
            .collect();

        self.store.upsert(ids, vectors, payloads)?;

        info!("Ingested {} chunks from '{}'", chunks.len(), source_id);
        Ok(IngestOutcome {
            ingested: chunks.len(),
        })
    }
}
