//! DuckDuckGo search backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use coursegen_shared::{CourseGenError, Result, SafeSearch};

use crate::parser;
use crate::{ImageHit, SearchBackend, SearchConfig, TextHit};

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("CourseGen/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow per request.
const MAX_REDIRECTS: usize = 3;

/// Search backend backed by DuckDuckGo's public endpoints.
pub struct DuckDuckGo {
    client: Client,
    config: SearchConfig,
}

impl DuckDuckGo {
    /// Create a backend with the given configuration.
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                CourseGenError::SearchBackend(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// GET `url` with query parameters and return the body of a 2xx response.
    async fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .get(url)
            .query(params)
            .header("Referer", format!("{}/", self.config.base_url))
            .send()
            .await
            .map_err(|e| CourseGenError::SearchBackend(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CourseGenError::SearchBackend(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| CourseGenError::SearchBackend(format!("{url}: failed to read body: {e}")))
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGo {
    #[instrument(skip_all, fields(query = %query, max_results))]
    async fn search_text(&self, query: &str, max_results: usize) -> Result<Vec<TextHit>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let body = self
            .fetch(
                &self.config.html_url,
                &[
                    ("q", query),
                    ("kl", self.config.region.as_str()),
                    ("kp", text_safesearch(self.config.safesearch)),
                ],
            )
            .await?;

        let hits = parser::parse_text_results(&body, max_results);
        debug!(hits = hits.len(), "text search complete");
        Ok(hits)
    }

    #[instrument(skip_all, fields(query = %query, max_results))]
    async fn search_images(&self, query: &str, max_results: usize) -> Result<Vec<ImageHit>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        // Step 1: the search page carries the per-query `vqd` token.
        let page = self.fetch(&self.config.base_url, &[("q", query)]).await?;
        let vqd = parser::extract_vqd(&page).ok_or_else(|| {
            CourseGenError::SearchBackend(format!("no vqd token returned for query {query:?}"))
        })?;

        // Step 2: the JSON image endpoint.
        let endpoint = format!("{}/i.js", self.config.base_url);
        let body = self
            .fetch(
                &endpoint,
                &[
                    ("l", self.config.region.as_str()),
                    ("o", "json"),
                    ("q", query),
                    ("vqd", vqd.as_str()),
                    ("f", ",,,,,"),
                    ("p", image_safesearch(self.config.safesearch)),
                ],
            )
            .await?;

        let hits = parser::parse_image_results(&body, max_results).map_err(|e| {
            CourseGenError::SearchBackend(format!("{endpoint}: invalid image response: {e}"))
        })?;

        debug!(hits = hits.len(), "image search complete");
        Ok(hits)
    }
}

/// `kp` value for the text endpoint.
fn text_safesearch(level: SafeSearch) -> &'static str {
    match level {
        SafeSearch::On => "1",
        SafeSearch::Moderate => "-1",
        SafeSearch::Off => "-2",
    }
}

/// `p` value for the image endpoint (it has no moderate level).
fn image_safesearch(level: SafeSearch) -> &'static str {
    match level {
        SafeSearch::On | SafeSearch::Moderate => "1",
        SafeSearch::Off => "-1",
    }
}
