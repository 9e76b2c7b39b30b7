
use itertools::izip;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{PointPayload, SearchHit, StoredPoint};
use crate::config::{Distance, QdrantConfig};
use crate::{RagError, Result, UpstreamFailure};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const SERVICE: &str = "Qdrant";

/// REST adapter for one Qdrant collection.
///
/// Owns the HTTP connection and isolates all wire details of the vector
/// index from the rest of the system. The handle is opened once (which
/// provisions the collection) and passed to both pipelines. Failures are
/// surfaced, never retried; retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct QdrantStore {
    base_url: Url,
    collection: String,
    dimension: usize,
    distance: Distance,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    points: Vec<StoredPoint>,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    points: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Option<PointPayload>,
}

#[derive(Debug, Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfo,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    #[serde(default)]
    points_count: Option<u64>,
}

impl QdrantStore {
    /// Open a handle to the configured collection, creating the collection if
    /// it does not exist yet. Safe to call on every construction.
    #[inline]
    pub fn connect(config: &QdrantConfig) -> Result<Self> {
        let base_url = config
            .parsed_url()
            .map_err(|e| RagError::Config(e.to_string()))?;

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        let store = Self {
            base_url,
            collection: config.collection.clone(),
            dimension: config.dimension as usize,
            distance: config.distance,
            agent,
        };

        store.ensure_collection()?;

        Ok(store)
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    /// Name of the collection this handle operates on.
    #[inline]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Create the collection if it is missing; a no-op when it already
    /// exists. An existing collection's dimension and metric are never
    /// validated or altered.
    #[inline]
    pub fn ensure_collection(&self) -> Result<()> {
        if self.collection_exists()? {
            debug!("Collection '{}' already exists", self.collection);
            return Ok(());
        }

        info!(
            "Creating collection '{}' (dimension {}, distance {})",
            self.collection,
            self.dimension,
            self.distance.as_str()
        );

        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: self.dimension,
                distance: self.distance.as_str(),
            },
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| UpstreamFailure::permanent(SERVICE, e.to_string()))?;

        let url = self.collection_url()?;
        self.agent
            .put(url.as_str())
            .header("Content-Type", "application/json")
            .send(&body)
            .map_err(|e| {
                warn!("Failed to create collection '{}': {}", self.collection, e);
                RagError::CollectionUnavailable(self.collection.clone())
            })?;

        Ok(())
    }

    /// Whether the configured collection currently exists.
    #[inline]
    pub fn collection_exists(&self) -> Result<bool> {
        let url = self.collection_url()?;

        match self.agent.get(url.as_str()).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::StatusCode(404)) => Ok(false),
            Err(e) => Err(UpstreamFailure::from_ureq(SERVICE, &e).into()),
        }
    }

    /// Write one point per index of the three parallel sequences, replacing
    /// any existing point with the same ID (vector and payload, not merged).
    /// The whole batch is sent as a single request with `wait=true`, so from
    /// the caller's view it either fully lands or fails.
    #[inline]
    pub fn upsert(
        &self,
        ids: Vec<String>,
        vectors: Vec<Vec<f32>>,
        payloads: Vec<PointPayload>,
    ) -> Result<()> {
        if ids.len() != vectors.len() || ids.len() != payloads.len() {
            return Err(RagError::MalformedBatch {
                ids: ids.len(),
                vectors: vectors.len(),
                payloads: payloads.len(),
            });
        }

        for vector in &vectors {
            self.check_dimension(vector)?;
        }

        let points: Vec<StoredPoint> = izip!(ids, vectors, payloads)
            .map(|(id, vector, payload)| StoredPoint {
                id,
                vector,
                payload,
            })
            .collect();
        let count = points.len();

        debug!(
            "Upserting {} points into collection '{}'",
            count, self.collection
        );

        let body = serde_json::to_string(&UpsertRequest { points })
            .map_err(|e| UpstreamFailure::permanent(SERVICE, e.to_string()))?;

        let url = self.points_url("points?wait=true")?;
        self.agent
            .put(url.as_str())
            .header("Content-Type", "application/json")
            .send(&body)
            .map_err(|e| self.map_collection_error(e))?;

        info!(
            "Upserted {} points into collection '{}'",
            count, self.collection
        );
        Ok(())
    }

    /// Return up to `top_k` points ranked by the collection's similarity
    /// metric, best match first. An empty collection yields an empty list,
    /// not an error.
    #[inline]
    pub fn similarity_search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        self.check_dimension(query_vector)?;

        debug!(
            "Searching collection '{}' for {} nearest points",
            self.collection, top_k
        );

        let request = QueryRequest {
            query: query_vector,
            limit: top_k,
            with_payload: true,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| UpstreamFailure::permanent(SERVICE, e.to_string()))?;

        let url = self.points_url("points/query")?;
        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| self.map_collection_error(e))?;

        let response: QueryResponse = serde_json::from_str(&response_text).map_err(|e| {
            UpstreamFailure::permanent(SERVICE, format!("unexpected query response: {e}"))
        })?;

        let hits: Vec<SearchHit> = response
            .result
            .points
            .into_iter()
            .map(|point| {
                let payload = point.payload.unwrap_or_default();
                SearchHit {
                    text: payload.text,
                    source_id: payload.source,
                    score: point.score,
                }
            })
            .collect();

        debug!("Search returned {} hits", hits.len());
        Ok(hits)
    }

    /// Number of points currently stored in the collection.
    #[inline]
    pub fn count_points(&self) -> Result<u64> {
        let url = self.collection_url()?;

        let response_text = self
            .agent
            .get(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| self.map_collection_error(e))?;

        let response: CollectionInfoResponse = serde_json::from_str(&response_text).map_err(|e| {
            UpstreamFailure::permanent(SERVICE, format!("unexpected collection info: {e}"))
        })?;

        Ok(response.result.points_count.unwrap_or(0))
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// A 404 from a point operation means the collection is gone; everything
    /// else is an upstream failure with its transient/permanent class.
    fn map_collection_error(&self, error: ureq::Error) -> RagError {
        if let ureq::Error::StatusCode(404) = error {
            RagError::CollectionUnavailable(self.collection.clone())
        } else {
            UpstreamFailure::from_ureq(SERVICE, &error).into()
        }
    }

    fn collection_url(&self) -> Result<Url> {
        self.base_url
            .join(&format!("/collections/{}", self.collection))
            .map_err(|e| UpstreamFailure::permanent(SERVICE, e.to_string()).into())
    }

    fn points_url(&self, suffix: &str) -> Result<Url> {
        self.base_url
            .join(&format!("/collections/{}/{}", self.collection, suffix))
            .map_err(|e| UpstreamFailure::permanent(SERVICE, e.to_string()).into())
    }
}
