//! Outline JSON Schema and best-effort validation.
//!
//! Validation is a soft gate: violations are reported and logged, and the
//! candidate value is always handed back to the caller.

use std::sync::LazyLock;

use serde_json::{Value, json};
use tracing::{debug, warn};

/// The contract the model's outline response is expected to satisfy.
///
/// Count targets from the prompt (topics per course, subtopics per topic)
/// are intentionally not part of it.
pub static OUTLINE_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["main_headline", "topics"],
        "properties": {
            "main_headline": { "type": "string" },
            "topics": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["headline", "subtopics"],
                    "properties": {
                        "headline": { "type": "string" },
                        "subtopics": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    }
                }
            }
        }
    })
});

static VALIDATOR: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    jsonschema::validator_for(&OUTLINE_SCHEMA).expect("outline schema compiles")
});

/// One way in which a candidate outline departs from [`OUTLINE_SCHEMA`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Human-readable description from the validator.
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Check `candidate` against the outline schema.
///
/// Never fails. Returns the candidate unchanged together with every
/// violation found (empty when it conforms).
pub fn validate_outline(candidate: Value) -> (Value, Vec<SchemaViolation>) {
    let violations: Vec<SchemaViolation> = VALIDATOR
        .iter_errors(&candidate)
        .map(|error| SchemaViolation {
            message: error.to_string(),
        })
        .collect();

    if violations.is_empty() {
        debug!("outline conforms to schema");
    } else {
        for violation in &violations {
            warn!(%violation, "outline schema violation");
        }
    }

    (candidate, violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conforming_outline_has_no_violations() {
        let candidate = json!({
            "main_headline": "Photosynthesis Basics",
            "topics": [
                { "headline": "Light Reactions", "subtopics": ["Chlorophyll", "ATP"] },
                { "headline": "Calvin Cycle", "subtopics": [] }
            ]
        });
        let (value, violations) = validate_outline(candidate.clone());
        assert!(violations.is_empty(), "unexpected: {violations:?}");
        assert_eq!(value, candidate);
    }

    #[test]
    fn empty_topics_conform() {
        let (_, violations) = validate_outline(json!({ "main_headline": "T", "topics": [] }));
        assert!(violations.is_empty());
    }

    #[test]
    fn missing_subtopics_is_reported_but_value_returned() {
        let candidate = json!({
            "main_headline": "Photosynthesis Basics",
            "topics": [ { "headline": "Light Reactions" } ]
        });
        let (value, violations) = validate_outline(candidate.clone());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("subtopics"));
        assert_eq!(value, candidate);
    }

    #[test]
    fn wrong_types_are_reported() {
        let candidate = json!({
            "main_headline": 7,
            "topics": [ { "headline": "A", "subtopics": ["ok", 3] } ]
        });
        let (_, violations) = validate_outline(candidate);
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn non_object_is_reported() {
        let (value, violations) = validate_outline(json!(["a", "b"]));
        assert!(!violations.is_empty());
        assert!(value.is_array());
    }

    #[test]
    fn count_targets_are_not_enforced() {
        let topics: Vec<Value> = (0..12)
            .map(|i| json!({ "headline": format!("Topic {i}"), "subtopics": ["a", "b", "c", "d", "e"] }))
            .collect();
        let (_, violations) = validate_outline(json!({ "main_headline": "Big", "topics": topics }));
        assert!(violations.is_empty());
    }

    #[test]
    fn fixture_outline_conforms() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/outline.fixture.json")
            .expect("read fixture");
        let value: Value = serde_json::from_str(&fixture).expect("parse fixture");
        let (_, violations) = validate_outline(value);
        assert!(violations.is_empty());
    }
}
