use anyhow::{Context, Result};
use console::style;
use std::fs;
use tracing::info;

use crate::config::Config;
use crate::openai::{CompletionClient, EmbeddingClient, api_key_from_env};
use crate::pipeline::{ChunkBatch, IngestOutcome, IngestPipeline, QueryOutcome, QueryPipeline};
use crate::store::QdrantStore;

/// Split raw document text into chunks on blank-line boundaries.
///
/// Stand-in for the external segmentation collaborator: the pipelines only
/// ever see the resulting ordered chunk sequence, so swapping in a real
/// sentence-window splitter changes nothing downstream.
#[inline]
pub fn segment_text(raw: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line.trim());
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Ingest one document: read it, segment it, and run the ingestion pipeline.
/// `source_id` defaults to the path when not supplied.
#[inline]
pub fn ingest_document(path: &str, source_id: Option<String>) -> Result<IngestOutcome> {
    let config = Config::load()?;

    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let batch = ChunkBatch {
        chunks: segment_text(&raw),
        source_id: source_id.unwrap_or_else(|| path.to_string()),
    };
    info!(
        "Segmented '{}' into {} chunks",
        batch.source_id,
        batch.chunks.len()
    );

    let api_key = api_key_from_env(&config.openai)?;
    let store = QdrantStore::connect(&config.qdrant).context("Failed to connect to Qdrant")?;
    let embeddings = EmbeddingClient::new(&config.openai, api_key)
        .context("Failed to initialize embedding client")?;

    let outcome = IngestPipeline::new(embeddings, store).ingest(&batch.source_id, &batch.chunks)?;

    eprintln!(
        "{} Ingested {} chunks from {}",
        style("✓").green(),
        style(outcome.ingested).bold(),
        style(&batch.source_id).cyan()
    );

    Ok(outcome)
}

/// Answer one question against the ingested corpus.
#[inline]
pub fn query_document(question: &str, top_k: usize) -> Result<QueryOutcome> {
    let config = Config::load()?;

    let api_key = api_key_from_env(&config.openai)?;
    let store = QdrantStore::connect(&config.qdrant).context("Failed to connect to Qdrant")?;
    let embeddings = EmbeddingClient::new(&config.openai, api_key.clone())
        .context("Failed to initialize embedding client")?;
    let completion = CompletionClient::new(&config.openai, api_key)
        .context("Failed to initialize completion client")?;

    let outcome = QueryPipeline::new(embeddings, completion, store).answer(question, top_k)?;

    println!("{}", outcome.answer);
    eprintln!();
    eprintln!(
        "{} {} context entries from {}",
        style("ℹ").blue(),
        outcome.num_contexts,
        if outcome.sources.is_empty() {
            "no sources".to_string()
        } else {
            outcome.sources.join(", ")
        }
    );

    Ok(outcome)
}

/// Show the collection the pipelines operate on and how many points it holds.
#[inline]
pub fn show_status() -> Result<()> {
    let config = Config::load()?;

    let store = QdrantStore::connect(&config.qdrant).context("Failed to connect to Qdrant")?;
    let points = store.count_points()?;

    eprintln!("{}", style("📦 Collection Status").bold().cyan());
    eprintln!("  URL: {}", style(&config.qdrant.url).cyan());
    eprintln!("  Collection: {}", style(store.collection()).cyan());
    eprintln!("  Dimension: {}", style(config.qdrant.dimension).cyan());
    eprintln!("  Points: {}", style(points).bold());

    Ok(())
}
