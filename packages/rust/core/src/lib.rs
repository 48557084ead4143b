//! Course generation pipeline for CourseGen.
//!
//! Four stages run in sequence against a [`coursegen_llm::LanguageModel`]
//! and a [`coursegen_search::SearchBackend`]: outline generation, evidence
//! retrieval, image retrieval, and content synthesis. [`pipeline::run`] and
//! [`pipeline::CourseGenerator::process`] are the entry points.

pub mod evidence;
pub mod images;
pub mod outline;
pub mod pipeline;
pub mod schema;
pub mod synthesis;

pub use pipeline::{CourseGenerator, PipelineStage, ProgressReporter, SilentProgress};

#[cfg(test)]
mod testing;
