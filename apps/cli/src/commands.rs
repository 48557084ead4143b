//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use coursegen_core::pipeline::{CourseGenerator, PipelineStage, ProgressReporter};
use coursegen_shared::{AppConfig, CourseGenError, CourseOutput, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// CourseGen: turn a topic into a sourced, illustrated course.
#[derive(Parser)]
#[command(
    name = "coursegen",
    version,
    about = "Generate an educational Markdown course from a topic query.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a course for a topic.
    Generate {
        /// Topic to build the course around.
        query: String,

        /// Write the course JSON here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write the course body as Markdown to this file.
        #[arg(long)]
        markdown: Option<PathBuf>,

        /// Model ID override (e.g., "openai/gpt-4o-mini").
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "coursegen=info",
        1 => "coursegen=debug",
        _ => "coursegen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            query,
            out,
            markdown,
            model,
        } => cmd_generate(&query, out.as_deref(), markdown.as_deref(), model).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

async fn cmd_generate(
    query: &str,
    out: Option<&Path>,
    markdown: Option<&Path>,
    model: Option<String>,
) -> Result<()> {
    let mut config = load_config()?;
    if let Some(model) = model {
        config.model.model = model;
    }

    let generator = CourseGenerator::from_config(&config)?;

    info!(query, model = %config.model.model, "generating course");

    let reporter = CliProgress::new();
    let output = generator.process(query, &reporter).await?;

    let json = serde_json::to_string_pretty(&output)?;
    match out {
        Some(path) => {
            let path = resolve_output(&config, path);
            write_file(&path, &json)?;
            eprintln!("  Course written to {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Some(path) = markdown {
        let path = resolve_output(&config, path);
        write_file(&path, &output.course_content)?;
        eprintln!("  Markdown written to {}", path.display());
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// Relative output paths land under `[defaults] output_dir`.
fn resolve_output(config: &AppConfig, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(&config.defaults.output_dir).join(path)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CourseGenError::io(parent, e))?;
    }
    std::fs::write(path, contents)
        .map_err(|e| CourseGenError::io(path, e))
        .wrap_err("failed to write output")
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, stage: PipelineStage) {
        let message = match stage {
            PipelineStage::Start => "Generating outline",
            PipelineStage::OutlineGenerated => "Searching for sources",
            PipelineStage::EvidenceRetrieved => "Searching for images",
            PipelineStage::ImagesRetrieved => "Writing course content",
            PipelineStage::ContentSynthesized | PipelineStage::Done => "Finishing",
        };
        self.spinner.set_message(message);
    }

    fn failed(&self, last: PipelineStage, _error: &CourseGenError) {
        self.spinner
            .abandon_with_message(format!("Failed after stage: {last}"));
    }

    fn done(&self, output: &CourseOutput) {
        self.spinner.finish_and_clear();
        eprintln!(
            "  {} ({} topics, {} images)",
            output.headlines.title_or(&output.query),
            output.headlines.topics.len(),
            output.images.len()
        );
    }
}
