//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file path (default: generated inside the scratch directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Commit the finished file into the media library
    #[arg(long)]
    pub library: bool,

    /// Watermark image override
    #[arg(long)]
    pub watermark: Option<PathBuf>,

    /// Configuration file path
    #[arg(long, env = "MARKX_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
