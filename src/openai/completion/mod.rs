
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::OpenAiConfig;
use crate::{RagError, Result, UpstreamFailure};

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TEMPERATURE: f32 = 0.2;
const SERVICE: &str = "Completion service";

/// Client for the `/v1/chat/completions` endpoint, used once per answered
/// question to phrase the final response.
#[derive(Clone)]
pub struct CompletionClient {
    base_url: Url,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl CompletionClient {
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
            model: config.completion_model.clone(),
            api_key,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
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

    #[inline]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Run one chat completion and return the generated text as-is.
    #[inline]
    pub fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        debug!("Requesting completion from {}", self.model);

        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| UpstreamFailure::permanent(SERVICE, e.to_string()))?;

        let url = self
            .base_url
            .join("/v1/chat/completions")
            .map_err(|e| UpstreamFailure::permanent(SERVICE, e.to_string()))?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| UpstreamFailure::from_ureq(SERVICE, &e))?;

        let response: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            UpstreamFailure::permanent(SERVICE, format!("unexpected response body: {e}"))
        })?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            UpstreamFailure::permanent(SERVICE, "response contained no choices".to_string())
        })?;

        Ok(choice.message.content)
    }
}
