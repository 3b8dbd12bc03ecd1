//! Command-line interface module

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{ExportArgs, InspectArgs};

/// MarkX video watermarker
#[derive(Parser, Debug)]
#[command(name = "watermark", version, about = "Composite a branded overlay onto a video and export it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watermark a video and export the result
    Export(ExportArgs),
    /// Probe a video file and print its track metadata
    Inspect(InspectArgs),
}
