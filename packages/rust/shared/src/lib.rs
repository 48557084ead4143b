//! Shared types, error model, and configuration for CourseGen.
//!
//! This crate is the foundation depended on by all other CourseGen crates.
//! It provides:
//! - [`CourseGenError`]: the unified error type
//! - Domain types ([`Outline`], [`Topic`], [`EvidenceItem`], [`ImageRecord`], [`CourseOutput`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ModelSection, SafeSearch, SearchSection, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{CourseGenError, Result};
pub use types::{CourseOutput, EvidenceItem, ImageRecord, Outline, Topic};
