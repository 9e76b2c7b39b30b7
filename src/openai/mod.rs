// OpenAI-compatible API clients
// The embedding and completion models are consumed as black boxes over HTTP;
// these clients own the wire details and nothing else.

pub mod completion;
pub mod embeddings;

pub use completion::CompletionClient;
pub use embeddings::EmbeddingClient;

use crate::config::OpenAiConfig;
use crate::{RagError, Result};

/// Read the API key from the environment variable named in the config. The
/// key never lives in the config file itself.
#[inline]
pub fn api_key_from_env(config: &OpenAiConfig) -> Result<String> {
    std::env::var(&config.api_key_env).map_err(|_| {
        RagError::Config(format!(
            "API key variable '{}' is not set",
            config.api_key_env
        ))
    })
}
