//! Error types for CourseGen.
//!
//! Library crates use [`CourseGenError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all CourseGen operations.
///
/// Schema violations are deliberately absent: they are diagnostics returned
/// alongside the outline, never a failure.
#[derive(Debug, thiserror::Error)]
pub enum CourseGenError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The model's outline response could not be parsed as JSON by any
    /// recovery strategy.
    #[error("malformed outline: {message}")]
    MalformedOutline { message: String },

    /// Failure surfaced by the text or image search backend.
    #[error("search backend error: {0}")]
    SearchBackend(String),

    /// Failure surfaced by the language model backend.
    #[error("model backend error: {0}")]
    ModelBackend(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CourseGenError>;

impl CourseGenError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-outline error from any displayable message.
    pub fn malformed_outline(msg: impl Into<String>) -> Self {
        Self::MalformedOutline {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CourseGenError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = CourseGenError::malformed_outline("expected value at line 1 column 1");
        assert!(err.to_string().starts_with("malformed outline:"));

        let err = CourseGenError::SearchBackend("HTTP 429".into());
        assert_eq!(err.to_string(), "search backend error: HTTP 429");
    }

    #[test]
    fn io_error_keeps_path() {
        let err = CourseGenError::io(
            "/tmp/out.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/out.json"));
        assert!(err.to_string().contains("denied"));
    }
}
