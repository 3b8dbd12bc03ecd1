//! MarkX CLI Video Watermarker
//!
//! Composites a branded overlay onto a source video and exports the result
//! as a new QuickTime file, optionally committing it into a local media
//! library.
//!
//! # Usage
//!
//! ```bash
//! watermark export --input "clip.mov"
//! watermark export --input "clip.mov" --output "out.mov" --library
//! watermark inspect --input "clip.mov" --json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use markx_cli::cli::{Cli, Commands};
use markx_cli::config::AppConfig;
use markx_cli::utils::logging::init_logging;

/// Main entry point for the MarkX CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Export(args) => AppConfig::load_or_default(args.config.as_deref())
            .context("Failed to load configuration")?,
        Commands::Inspect(_) => AppConfig::default(),
    };

    init_logging(&config.log_level);
    info!("Starting MarkX video watermarker");

    // Initialize FFmpeg once for the whole process
    markx_cli::init()?;

    match cli.command {
        Commands::Export(args) => {
            markx_cli::cli::commands::export(args, config).await?;
        }
        Commands::Inspect(args) => {
            markx_cli::cli::commands::inspect(args)?;
        }
    }

    Ok(())
}
