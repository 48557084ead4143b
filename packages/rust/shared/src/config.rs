//! Application configuration for CourseGen.
//!
//! User config lives at `~/.coursegen/coursegen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CourseGenError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "coursegen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".coursegen";

// ---------------------------------------------------------------------------
// Config structs (matching coursegen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Language model settings.
    #[serde(default)]
    pub model: ModelSection,

    /// Web search settings.
    #[serde(default)]
    pub search: SearchSection,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory where `generate --out` writes relative output paths.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}

/// `[model]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible API root; `/chat/completions` is appended.
    #[serde(default = "default_model_base_url")]
    pub base_url: String,

    /// System instruction sent ahead of every prompt.
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_model_base_url(),
            system_instruction: default_system_instruction(),
            temperature: default_temperature(),
            timeout_secs: default_model_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "google/gemini-2.0-flash-001".into()
}
fn default_model_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_system_instruction() -> String {
    "You are an expert educator who writes accurate, well-structured learning material.".into()
}
fn default_temperature() -> f32 {
    0.4
}
fn default_model_timeout() -> u64 {
    120
}

/// Safe-search level passed to the search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    On,
    #[default]
    Moderate,
    Off,
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSection {
    /// Region code (`kl` parameter), e.g. `wt-wt` or `us-en`.
    #[serde(default = "default_region")]
    pub region: String,

    /// Safe-search level.
    #[serde(default)]
    pub safesearch: SafeSearch,

    /// Request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Endpoint serving the no-JavaScript text results page.
    #[serde(default = "default_html_url")]
    pub html_url: String,

    /// Site root used for the image token page and `i.js`.
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            region: default_region(),
            safesearch: SafeSearch::default(),
            timeout_secs: default_search_timeout(),
            html_url: default_html_url(),
            base_url: default_search_base_url(),
        }
    }
}

fn default_region() -> String {
    "wt-wt".into()
}
fn default_search_timeout() -> u64 {
    20
}
fn default_html_url() -> String {
    "https://html.duckduckgo.com/html/".into()
}
fn default_search_base_url() -> String {
    "https://duckduckgo.com".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.coursegen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CourseGenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.coursegen/coursegen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CourseGenError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CourseGenError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CourseGenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CourseGenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CourseGenError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("OPENROUTER_API_KEY"));
        assert!(toml_str.contains("safesearch = \"moderate\""));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.model.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(parsed.model.timeout_secs, 120);
        assert_eq!(parsed.search.region, "wt-wt");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[model]
model = "openai/gpt-4o-mini"

[search]
safesearch = "off"
region = "us-en"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.model.model, "openai/gpt-4o-mini");
        assert_eq!(config.model.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.search.safesearch, SafeSearch::Off);
        assert_eq!(config.search.region, "us-en");
        assert_eq!(config.search.html_url, "https://html.duckduckgo.com/html/");
    }

    #[test]
    fn unknown_safesearch_is_rejected() {
        let toml_str = "[search]\nsafesearch = \"strict\"\n";
        let result: std::result::Result<AppConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let err = load_config_from(Path::new("/nonexistent/coursegen.toml")).unwrap_err();
        assert!(matches!(err, CourseGenError::Io { .. }));
    }
}
