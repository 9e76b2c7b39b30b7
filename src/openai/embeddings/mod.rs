#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::OpenAiConfig;
use crate::{RagError, Result, UpstreamFailure};

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const SERVICE: &str = "Embedding service";

/// Client for the `/v1/embeddings` endpoint.
///
/// Ingestion and querying must share one embedding model: a query vector is
/// only comparable to the corpus if both were produced by the same model.
/// That consistency is this client's reason to exist as a single type used
/// by both pipelines.
#[derive(Clone)]
pub struct EmbeddingClient {
    base_url: Url,
    model: String,
    api_key: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    #[inline]
    pub fn new(config: &OpenAiConfig, api_key: String) -> Result<Self> {
        let base_url = config
            .parsed_url()
            .map_err(|e| RagError::Config(e.to_string()))?;

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.embedding_model.clone(),
            api_key,
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    /// Embed all texts in one request and return the vectors in input order.
    ///
    /// A whole document goes through as a single batch: one suspension point
    /// for the caller, and one model version across every chunk.
    #[inline]
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding batch of {} texts with {}", texts.len(), self.model);

        let request = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| UpstreamFailure::permanent(SERVICE, e.to_string()))?;

        let url = self
            .base_url
            .join("/v1/embeddings")
            .map_err(|e| UpstreamFailure::permanent(SERVICE, e.to_string()))?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| UpstreamFailure::from_ureq(SERVICE, &e))?;

        let response: EmbeddingsResponse = serde_json::from_str(&response_text).map_err(|e| {
            UpstreamFailure::permanent(SERVICE, format!("unexpected response body: {e}"))
        })?;

        if response.data.len() != texts.len() {
            return Err(UpstreamFailure::permanent(
                SERVICE,
                format!(
                    "requested {} embeddings, received {}",
                    texts.len(),
                    response.data.len()
                ),
            )
            .into());
        }

        // The API tags each item with its input index; order by it rather
        // than trusting response order.
        let mut vectors: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        for item in response.data {
            let slot = vectors.get_mut(item.index).ok_or_else(|| {
                UpstreamFailure::permanent(
                    SERVICE,
                    format!("embedding index {} out of range", item.index),
                )
            })?;
            *slot = Some(item.embedding);
        }

        let vectors: Vec<Vec<f32>> = vectors
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| {
                    UpstreamFailure::permanent(SERVICE, format!("no embedding for input {i}"))
                })
            })
            .collect::<std::result::Result<_, UpstreamFailure>>()?;

        debug!("Received {} embeddings", vectors.len());
        Ok(vectors)
    }

    /// Embed a single text (the query side of the pipeline).
    #[inline]
    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut vectors = self.embed_batch(&input)?;
        vectors.pop().ok_or_else(|| {
            UpstreamFailure::permanent(SERVICE, "empty embedding response".to_string()).into()
        })
    }
}
