//! Scripted collaborators for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use coursegen_llm::LanguageModel;
use coursegen_search::{ImageHit, SearchBackend, TextHit};
use coursegen_shared::{CourseGenError, Result};

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Replays queued responses in order and records every prompt.
pub(crate) struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying<S: AsRef<str>>(responses: &[S]) -> Self {
        Self::new(
            responses
                .iter()
                .map(|r| Ok(r.as_ref().to_string()))
                .collect(),
        )
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CourseGenError::ModelBackend("script exhausted".into())))
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchKind {
    Text,
    Image,
}

/// One recorded search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchCall {
    pub kind: SearchKind,
    pub query: String,
    pub max_results: usize,
}

/// Serves canned hits keyed by exact query text and records every call.
///
/// Unknown queries return no hits. Like a real backend, at most
/// `max_results` hits are returned.
#[derive(Default)]
pub(crate) struct ScriptedSearch {
    text: HashMap<String, Vec<TextHit>>,
    images: HashMap<String, Vec<ImageHit>>,
    text_failure: Option<String>,
    image_failure: Option<String>,
    calls: Mutex<Vec<SearchCall>>,
}

impl ScriptedSearch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_text(mut self, query: &str, hits: Vec<TextHit>) -> Self {
        self.text.insert(query.to_string(), hits);
        self
    }

    pub(crate) fn with_images(mut self, query: &str, hits: Vec<ImageHit>) -> Self {
        self.images.insert(query.to_string(), hits);
        self
    }

    pub(crate) fn failing_text(mut self, message: &str) -> Self {
        self.text_failure = Some(message.to_string());
        self
    }

    pub(crate) fn failing_images(mut self, message: &str) -> Self {
        self.image_failure = Some(message.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: SearchKind, query: &str, max_results: usize) {
        self.calls.lock().unwrap().push(SearchCall {
            kind,
            query: query.to_string(),
            max_results,
        });
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearch {
    async fn search_text(&self, query: &str, max_results: usize) -> Result<Vec<TextHit>> {
        self.record(SearchKind::Text, query, max_results);
        if let Some(message) = &self.text_failure {
            return Err(CourseGenError::SearchBackend(message.clone()));
        }
        Ok(self
            .text
            .get(query)
            .map(|hits| hits.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }

    async fn search_images(&self, query: &str, max_results: usize) -> Result<Vec<ImageHit>> {
        self.record(SearchKind::Image, query, max_results);
        if let Some(message) = &self.image_failure {
            return Err(CourseGenError::SearchBackend(message.clone()));
        }
        Ok(self
            .images
            .get(query)
            .map(|hits| hits.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub(crate) fn text_hit(title: &str, href: &str) -> TextHit {
    TextHit {
        title: title.to_string(),
        body: format!("About {title}."),
        href: href.to_string(),
    }
}

pub(crate) fn image_hit(title: Option<&str>, image: &str, page: Option<&str>) -> ImageHit {
    ImageHit {
        title: title.map(str::to_string),
        image: Some(image.to_string()),
        url: page.map(str::to_string),
    }
}
