//! Web text and image search capability for CourseGen.
//!
//! The core depends only on [`SearchBackend`]. [`DuckDuckGo`] is the
//! production backend: it scrapes the no-JavaScript results page for text
//! hits and uses the `i.js` JSON endpoint for images.

mod duckduckgo;
mod parser;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use coursegen_shared::{AppConfig, Result, SafeSearch};

pub use duckduckgo::DuckDuckGo;

/// One text-search hit: `{title, body, href}`.
pub type TextHit = coursegen_shared::EvidenceItem;

/// One raw image-search hit. Any field may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHit {
    /// Image caption or page title.
    #[serde(default)]
    pub title: Option<String>,
    /// Direct URL of the image resource.
    #[serde(default)]
    pub image: Option<String>,
    /// URL of the page the image was found on.
    #[serde(default)]
    pub url: Option<String>,
}

/// A web search provider.
///
/// Implementations return at most `max_results` hits, report every failure
/// as [`coursegen_shared::CourseGenError::SearchBackend`], and never retry.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a text search.
    async fn search_text(&self, query: &str, max_results: usize) -> Result<Vec<TextHit>>;

    /// Run an image search.
    async fn search_images(&self, query: &str, max_results: usize) -> Result<Vec<ImageHit>>;
}

// ---------------------------------------------------------------------------
// SearchConfig
// ---------------------------------------------------------------------------

/// Runtime search configuration, taken from the `[search]` config section.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Region code (`kl`).
    pub region: String,
    /// Safe-search level.
    pub safesearch: SafeSearch,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Text results endpoint.
    pub html_url: String,
    /// Site root for the image token page and `i.js`.
    pub base_url: String,
}

impl From<&AppConfig> for SearchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            region: config.search.region.clone(),
            safesearch: config.search.safesearch,
            timeout_secs: config.search.timeout_secs,
            html_url: config.search.html_url.clone(),
            base_url: config.search.base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}
