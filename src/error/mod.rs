//! Error handling module for MarkX

use thiserror::Error;

/// Main error type for MarkX operations
#[derive(Error, Debug)]
pub enum MarkXError {
    /// FFmpeg initialization error
    #[error("Failed to initialize FFmpeg: {message}")]
    FFmpegInitError { message: String },

    /// Source asset unreadable or missing a usable video track
    #[error("Asset error: {message}")]
    AssetError { message: String },

    /// Copying a time range into the composition failed
    #[error("Composition error: {message}")]
    CompositionError { message: String },

    /// Brand overlay image missing or undecodable
    #[error("Overlay error: {message}")]
    OverlayError { message: String },

    /// Render/export step failed
    #[error("Export failed: {message}")]
    ExportError { message: String },

    /// Library commit failed
    #[error("Persistence error: {message}")]
    PersistenceError { message: String },

    /// Configuration file invalid
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// I/O error (destination cleanup, scratch directory handling)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for MarkX operations
pub type MarkXResult<T> = std::result::Result<T, MarkXError>;
