//! Core domain types for generated courses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

/// The course syllabus produced by the language model.
///
/// Every field is optional at the data level because the model is not
/// guaranteed to honor the schema. Use the accessors, which state the
/// default applied when a field is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Course title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_headline: Option<String>,
    /// Topics in presentation order.
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// One top-level topic of an [`Outline`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    /// Subtopics in presentation order (possibly empty).
    #[serde(default)]
    pub subtopics: Vec<String>,
}

impl Outline {
    /// Build an outline from an arbitrary parsed JSON value.
    ///
    /// Never fails: absent or wrongly-typed fields become `None` / empty.
    pub fn from_value(value: &Value) -> Self {
        let main_headline = value
            .get("main_headline")
            .and_then(Value::as_str)
            .map(str::to_string);

        let topics = value
            .get("topics")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Topic::from_value).collect())
            .unwrap_or_default();

        Self {
            main_headline,
            topics,
        }
    }

    /// The course title, or `fallback` (normally the query) when absent.
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.main_headline.as_deref().unwrap_or(fallback)
    }
}

impl Topic {
    /// Build a topic from an arbitrary JSON value (see [`Outline::from_value`]).
    ///
    /// Non-string scalar subtopics are kept in their JSON text form; nulls,
    /// arrays and objects are dropped.
    pub fn from_value(value: &Value) -> Self {
        let headline = value
            .get("headline")
            .and_then(Value::as_str)
            .map(str::to_string);

        let subtopics = value
            .get("subtopics")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(_) | Value::Bool(_) => Some(item.to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            headline,
            subtopics,
        }
    }

    /// The topic headline, or the empty string when absent.
    pub fn headline_or_empty(&self) -> &str {
        self.headline.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// One text-search result used as grounding material.
///
/// `href` is the source identity used for deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Display name of the source.
    #[serde(default)]
    pub title: String,
    /// Snippet text.
    #[serde(default)]
    pub body: String,
    /// Source URL.
    #[serde(default)]
    pub href: String,
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// A retrieved image, normalized for placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Dense 1-based id, assigned in retrieval order.
    pub id: u32,
    /// Direct image URL.
    pub url: String,
    /// Image title (falls back to "Image related to {query}").
    pub title: String,
    /// Page the image was found on (may be empty).
    pub source: String,
}

// ---------------------------------------------------------------------------
// CourseOutput
// ---------------------------------------------------------------------------

/// The final artifact of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOutput {
    /// The query exactly as supplied.
    pub query: String,
    /// The generated outline.
    pub headlines: Outline,
    /// Markdown course body with image placeholders resolved.
    pub course_content: String,
    /// Images available to the course, in id order.
    pub images: Vec<ImageRecord>,
}
