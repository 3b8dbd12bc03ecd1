//! MarkX CLI Video Watermarker Library
//!
//! A command-line tool that composites a branded overlay onto a source video
//! and exports the result as a new QuickTime file, with optional commit into
//! a local media library.

pub mod app;
pub mod cli;
pub mod compose;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod library;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{AssetInfo, AudioTrackInfo, Dimensions, Transform, VideoTrackInfo};
pub use error::{MarkXError, MarkXResult};

/// Initialize MarkX library
pub fn init() -> MarkXResult<()> {
    // Initialize FFmpeg
    ffmpeg_next::init().map_err(|e| MarkXError::FFmpegInitError {
        message: e.to_string(),
    })?;

    Ok(())
}
