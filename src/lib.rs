use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No chunks were supplied for ingestion")]
    EmptyInput,

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Batch length mismatch: {ids} ids, {vectors} vectors, {payloads} payloads")]
    MalformedBatch {
        ids: usize,
        vectors: usize,
        payloads: usize,
    },

    #[error("Vector has {actual} dimensions, collection is configured for {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Collection '{0}' does not exist and could not be created")]
    CollectionUnavailable(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// A failed call to one of the external services (embedding model, completion
/// model, or the vector store). `transient` tells the external scheduler
/// whether retrying the whole operation could succeed; the core itself never
/// retries.
#[derive(Error, Debug)]
#[error("{service} request failed: {detail}")]
pub struct UpstreamFailure {
    pub service: &'static str,
    pub detail: String,
    pub transient: bool,
}

impl UpstreamFailure {
    /// Classify a `ureq` error. Transport failures and 408/429/5xx responses
    /// are worth retrying; everything else is permanent.
    #[inline]
    pub fn from_ureq(service: &'static str, error: &ureq::Error) -> Self {
        let transient = match error {
            ureq::Error::StatusCode(status) => *status == 408 || *status == 429 || *status >= 500,
            ureq::Error::ConnectionFailed
            | ureq::Error::HostNotFound
            | ureq::Error::Timeout(_)
            | ureq::Error::Io(_) => true,
            _ => false,
        };

        Self {
            service,
            detail: error.to_string(),
            transient,
        }
    }

    /// A failure that will not resolve on retry, e.g. a response body that
    /// does not match the service's documented schema.
    #[inline]
    pub fn permanent(service: &'static str, detail: impl Into<String>) -> Self {
        Self {
            service,
            detail: detail.into(),
            transient: false,
        }
    }
}

impl RagError {
    /// Whether the external scheduler may retry the failed operation.
    #[inline]
    pub fn is_transient(&self) -> bool {
        match self {
            RagError::Upstream(failure) => failure.transient,
            _ => false,
        }
    }
}

pub mod commands;
pub mod config;
pub mod identity;
pub mod openai;
pub mod pipeline;
pub mod store;
