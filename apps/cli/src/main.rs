//! CourseGen CLI: generate an educational course from a topic query.
//!
//! Combines a language model with web text and image search to produce a
//! Markdown course with cited sources and inline images.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
