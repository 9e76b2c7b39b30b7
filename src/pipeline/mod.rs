// Pipeline module
// The two operations invoked by the external scheduler, plus the stage
// records they exchange. Every record serializes, so a durable scheduler can
// checkpoint between stages.

pub mod context;
pub mod ingest;
pub mod query;

pub use context::{ContextSet, aggregate};
pub use ingest::IngestPipeline;
pub use query::{DEFAULT_TOP_K, QueryPipeline};

use serde::{Deserialize, Serialize};

/// Output of the external segmentation stage: one document's chunks in
/// extraction order, plus the id they will be stored under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkBatch {
    pub chunks: Vec<String>,
    pub source_id: String,
}

/// Result of one ingestion run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestOutcome {
    pub ingested: usize,
}

/// Result of one answered question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryOutcome {
    pub answer: String,
    pub sources: Vec<String>,
    pub num_contexts: usize,
}
