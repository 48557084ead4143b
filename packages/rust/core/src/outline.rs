//! Outline generation: schema-constrained prompt, layered JSON recovery,
//! and best-effort schema validation.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use coursegen_llm::LanguageModel;
use coursegen_shared::{CourseGenError, Outline, Result};

use crate::schema::{self, OUTLINE_SCHEMA};

/// Matches a fenced block tagged as JSON and captures its interior.
///
/// The closing fence must start a line or end one, so backticks inside a
/// JSON string do not close the block.
static JSON_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ism)```json[ \t]*\r?\n?(.*?)(?:\r?\n[ \t]*```|```[ \t]*$)")
        .expect("json fence regex")
});

/// Matches any fenced block (with or without a language tag).
static ANY_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?sm)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)(?:\r?\n[ \t]*```|```[ \t]*$)")
        .expect("fence regex")
});

/// Which recovery step produced the parsed outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The response was bare JSON.
    Raw,
    /// The interior of a ```` ```json ```` block.
    JsonFence,
    /// The interior of an untagged (or otherwise tagged) fenced block.
    AnyFence,
    /// The whole response after stripping a BOM and surrounding whitespace.
    Trimmed,
}

/// Build the outline prompt for `query`, embedding the schema verbatim.
pub fn build_outline_prompt(query: &str) -> String {
    let schema = serde_json::to_string_pretty(&*OUTLINE_SCHEMA).unwrap_or_default();

    format!(
        r#"Create a comprehensive course syllabus for a learning module about: "{query}".

Provide 5-7 main topics. For each topic, provide 2-3 subtopics that should be covered.

Respond strictly with JSON matching this JSON Schema and nothing else:
{schema}

Example of the expected shape:
{{
  "main_headline": "The course title",
  "topics": [
    {{
      "headline": "Topic 1",
      "subtopics": ["Subtopic 1.1", "Subtopic 1.2"]
    }}
  ]
}}
"#
    )
}

/// Parse a model response into a JSON value.
///
/// Attempts, in order: the raw text, the first ```` ```json ```` block,
/// the first fenced block of any kind, then the trimmed raw text. The first
/// success wins.
pub fn parse_outline_response(raw: &str) -> Result<(Value, ParseStrategy)> {
    let json_fence = JSON_FENCE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    let any_fence = ANY_FENCE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    let trimmed = raw.trim_start_matches('\u{feff}').trim();

    let attempts = [
        (ParseStrategy::Raw, Some(raw)),
        (ParseStrategy::JsonFence, json_fence),
        (ParseStrategy::AnyFence, any_fence),
        (ParseStrategy::Trimmed, Some(trimmed)),
    ];

    let mut first_error: Option<serde_json::Error> = None;
    for (strategy, candidate) in attempts {
        let Some(text) = candidate else {
            continue;
        };
        match serde_json::from_str::<Value>(text) {
            Ok(value) => return Ok((value, strategy)),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    let reason = first_error.map(|e| e.to_string()).unwrap_or_default();
    let preview: String = raw.chars().take(200).collect();
    Err(CourseGenError::malformed_outline(format!(
        "response is not valid JSON ({reason}); got: {preview}"
    )))
}

/// Ask the model for a course outline.
///
/// Schema violations are logged and tolerated; only an unparseable response
/// (or a model failure) is an error.
#[instrument(skip_all, fields(query = %query))]
pub async fn generate_outline(model: &dyn LanguageModel, query: &str) -> Result<Outline> {
    let prompt = build_outline_prompt(query);
    let response = model.generate(&prompt).await?;

    let (value, strategy) = parse_outline_response(&response)?;
    debug!(?strategy, "outline response parsed");

    let (value, violations) = schema::validate_outline(value);
    if !violations.is_empty() {
        warn!(
            violations = violations.len(),
            "outline does not match schema, continuing with best-effort outline"
        );
    }

    let outline = Outline::from_value(&value);
    info!(topics = outline.topics.len(), "outline generated");
    Ok(outline)
}
