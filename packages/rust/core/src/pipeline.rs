//! End-to-end course pipeline: query → outline → evidence → images → content.

use std::time::Instant;

use tracing::{error, info, instrument};

use coursegen_llm::{LanguageModel, ModelConfig, OpenRouterModel};
use coursegen_search::{DuckDuckGo, SearchBackend, SearchConfig};
use coursegen_shared::{AppConfig, CourseGenError, CourseOutput, Result};

use crate::{evidence, images, outline, synthesis};

/// Pipeline states, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    OutlineGenerated,
    EvidenceRetrieved,
    ImagesRetrieved,
    ContentSynthesized,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::OutlineGenerated => "outline generated",
            Self::EvidenceRetrieved => "evidence retrieved",
            Self::ImagesRetrieved => "images retrieved",
            Self::ContentSynthesized => "content synthesized",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called on every state transition, including `Start` and `Done`.
    fn stage(&self, stage: PipelineStage);
    /// Called once when the run fails; `last` is the last state reached.
    fn failed(&self, last: PipelineStage, error: &CourseGenError);
    /// Called when the pipeline completes.
    fn done(&self, output: &CourseOutput);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: PipelineStage) {}
    fn failed(&self, _last: PipelineStage, _error: &CourseGenError) {}
    fn done(&self, _output: &CourseOutput) {}
}

/// Run the full pipeline for `query`.
///
/// Stages run strictly one after another. The first failure aborts the run
/// and is returned unchanged; no partial output is produced.
#[instrument(skip_all, fields(query = %query))]
pub async fn run(
    query: &str,
    model: &dyn LanguageModel,
    search: &dyn SearchBackend,
    progress: &dyn ProgressReporter,
) -> Result<CourseOutput> {
    let start = Instant::now();
    let mut stage = PipelineStage::Start;
    progress.stage(stage);
    info!("starting course pipeline");

    match run_stages(query, model, search, progress, &mut stage).await {
        Ok(output) => {
            progress.stage(PipelineStage::Done);
            info!(
                topics = output.headlines.topics.len(),
                images = output.images.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "course pipeline complete"
            );
            progress.done(&output);
            Ok(output)
        }
        Err(e) => {
            error!(last_stage = %stage, error = %e, "course pipeline failed");
            progress.failed(stage, &e);
            Err(e)
        }
    }
}

async fn run_stages(
    query: &str,
    model: &dyn LanguageModel,
    search: &dyn SearchBackend,
    progress: &dyn ProgressReporter,
    stage: &mut PipelineStage,
) -> Result<CourseOutput> {
    let mut advance = |next: PipelineStage| {
        *stage = next;
        info!(stage = %next, "pipeline stage reached");
        progress.stage(next);
    };

    let outline = outline::generate_outline(model, query).await?;
    advance(PipelineStage::OutlineGenerated);

    let evidence = evidence::retrieve_evidence(search, query, &outline).await?;
    advance(PipelineStage::EvidenceRetrieved);

    let images = images::retrieve_images(search, query, &outline).await?;
    advance(PipelineStage::ImagesRetrieved);

    let course_content = synthesis::synthesize(model, query, &outline, &evidence, &images).await?;
    advance(PipelineStage::ContentSynthesized);

    Ok(CourseOutput {
        query: query.to_string(),
        headlines: outline,
        course_content,
        images,
    })
}

// ---------------------------------------------------------------------------
// CourseGenerator
// ---------------------------------------------------------------------------

/// Owns the model and search collaborators and exposes [`process`](Self::process).
pub struct CourseGenerator {
    model: Box<dyn LanguageModel>,
    search: Box<dyn SearchBackend>,
}

impl CourseGenerator {
    /// Build a generator from explicit collaborators.
    pub fn new(model: Box<dyn LanguageModel>, search: Box<dyn SearchBackend>) -> Self {
        Self { model, search }
    }

    /// Build the production generator: OpenRouter for the model and
    /// DuckDuckGo for search.
    ///
    /// Fails with a config error when the API key env var is unset.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let model = OpenRouterModel::new(ModelConfig::from_app_config(config)?)?;
        let search = DuckDuckGo::new(SearchConfig::from(config))?;
        Ok(Self::new(Box::new(model), Box::new(search)))
    }

    /// Generate a course for `query`.
    pub async fn process(
        &self,
        query: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<CourseOutput> {
        run(query, self.model.as_ref(), self.search.as_ref(), progress).await
    }
}
