//! Language model capability for CourseGen.
//!
//! The core only ever sees [`LanguageModel`]: a single-shot, stateless
//! `prompt -> text` call. [`OpenRouterModel`] is the production backend,
//! speaking the OpenAI-compatible chat-completions protocol.

mod openrouter;

use async_trait::async_trait;
use coursegen_shared::{AppConfig, CourseGenError, Result};

pub use openrouter::OpenRouterModel;

/// A text-generation backend.
///
/// Implementations must report every failure as
/// [`CourseGenError::ModelBackend`] and must not retry.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one prompt and return the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

/// Construction-time configuration for a model client.
///
/// Required: `api_key`, `model_id`, `system_instruction`. The remaining
/// fields carry defaults from [`coursegen_shared::ModelSection`].
#[derive(Clone)]
pub struct ModelConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Model identifier, e.g. `google/gemini-2.0-flash-001`.
    pub model_id: String,
    /// System message sent ahead of every prompt.
    pub system_instruction: String,
    /// API root; `/chat/completions` is appended.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ModelConfig {
    /// Resolve a model config from the app config, reading the API key from
    /// the environment variable named by `[model].api_key_env`.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let var_name = &config.model.api_key_env;
        let api_key = match std::env::var(var_name) {
            Ok(val) if !val.trim().is_empty() => val,
            _ => {
                return Err(CourseGenError::config(format!(
                    "model API key not found. Set the {var_name} environment variable.\n\
                     Get a key at https://openrouter.ai/keys"
                )));
            }
        };

        Ok(Self::with_api_key(config, api_key))
    }

    /// Build a model config from the app config and an explicit key.
    pub fn with_api_key(config: &AppConfig, api_key: impl Into<String>) -> Self {
        let section = &config.model;
        Self {
            api_key: api_key.into(),
            model_id: section.model.clone(),
            system_instruction: section.system_instruction.clone(),
            base_url: section.base_url.clone(),
            temperature: section.temperature,
            timeout_secs: section.timeout_secs,
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("model_id", &self.model_id)
            .field("system_instruction", &self.system_instruction)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_config_error() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.model.api_key_env = "CG_TEST_NONEXISTENT_KEY_12345".into();
        let err = ModelConfig::from_app_config(&config).unwrap_err();
        assert!(matches!(err, CourseGenError::Config { .. }));
        assert!(err.to_string().contains("CG_TEST_NONEXISTENT_KEY_12345"));
    }

    #[test]
    fn with_api_key_copies_model_section() {
        let mut config = AppConfig::default();
        config.model.model = "openai/gpt-4o-mini".into();
        config.model.timeout_secs = 30;
        let model_config = ModelConfig::with_api_key(&config, "sk-test");
        assert_eq!(model_config.api_key, "sk-test");
        assert_eq!(model_config.model_id, "openai/gpt-4o-mini");
        assert_eq!(model_config.timeout_secs, 30);
        assert_eq!(model_config.base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let model_config = ModelConfig::with_api_key(&AppConfig::default(), "sk-secret");
        let rendered = format!("{model_config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
