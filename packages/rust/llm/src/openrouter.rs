//! OpenRouter (OpenAI-compatible) chat-completions backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use coursegen_shared::{CourseGenError, Result};

use crate::{LanguageModel, ModelConfig};

/// User-Agent string for model requests.
const USER_AGENT: &str = concat!("CourseGen/", env!("CARGO_PKG_VERSION"));

/// `X-Title` header OpenRouter uses for app attribution.
const APP_TITLE: &str = "coursegen";

/// Language model client for any OpenAI-compatible chat-completions API.
pub struct OpenRouterModel {
    client: Client,
    endpoint: String,
    config: ModelConfig,
}

impl OpenRouterModel {
    /// Build a client from an explicit configuration.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                CourseGenError::ModelBackend(format!("failed to build HTTP client: {e}"))
            })?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenRouterModel {
    #[instrument(skip_all, fields(model = %self.config.model_id, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model_id,
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.config.api_key.trim())
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await
            .map_err(|e| CourseGenError::ModelBackend(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(CourseGenError::ModelBackend(format!(
                "{}: HTTP {status}: {}",
                self.endpoint,
                text.chars().take(500).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            CourseGenError::ModelBackend(format!("failed to decode chat response: {e}"))
        })?;

        extract_text(parsed)
    }
}

/// Pull the first non-empty completion out of a decoded response.
fn extract_text(response: ChatResponse) -> Result<String> {
    if let Some(error) = response.error {
        return Err(CourseGenError::ModelBackend(error.message));
    }

    if let Some(usage) = &response.usage {
        debug!(
            tokens_in = usage.prompt_tokens,
            tokens_out = usage.completion_tokens,
            "chat completion usage"
        );
    }

    response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content.filter(|text| !text.trim().is_empty()))
        .ok_or_else(|| CourseGenError::ModelBackend("response contained no content".into()))
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
