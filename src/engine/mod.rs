//! Export engine module

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compose::{Composition, LayerStack, RenderInstructions, Watermark};

pub mod compositor;
pub mod exporter;
mod renderer;

pub use exporter::Exporter;

/// Fixed output container extension (QuickTime)
pub const OUTPUT_CONTAINER_EXT: &str = "mov";

/// Export quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportPreset {
    /// Highest available quality; the pipeline default
    Highest,
    /// Balanced quality/size
    Balanced,
    /// Smallest output
    Compact,
}

impl ExportPreset {
    /// Constant rate factor for the H.264 encoder
    pub fn crf(&self) -> u8 {
        match self {
            ExportPreset::Highest => 16,
            ExportPreset::Balanced => 20,
            ExportPreset::Compact => 26,
        }
    }

    /// Encoder speed preset
    pub fn encoder_preset(&self) -> &'static str {
        match self {
            ExportPreset::Highest => "slow",
            ExportPreset::Balanced => "medium",
            ExportPreset::Compact => "fast",
        }
    }
}

impl Default for ExportPreset {
    fn default() -> Self {
        ExportPreset::Highest
    }
}

/// Phases of one export job. Terminal phases are final; no transition
/// re-enters `Rendering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportPhase {
    /// Job assembled, nothing started
    Created,
    /// Cleaning up the destination path
    Preparing,
    /// Render in progress
    Rendering,
    /// Output file produced and verified
    Succeeded,
    /// Job failed; no partial output left behind
    Failed,
}

impl ExportPhase {
    /// Whether the phase is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportPhase::Succeeded | ExportPhase::Failed)
    }
}

/// One export attempt: the composition, layer stack, instructions, overlay
/// pixels, destination path, and quality preset. Created at export start and
/// discarded once the outcome is delivered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub composition: Composition,
    pub layers: LayerStack,
    pub instructions: RenderInstructions,
    pub watermark: Arc<Watermark>,
    pub destination: PathBuf,
    pub preset: ExportPreset,
}

/// Terminal report for a successful export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub phase: ExportPhase,
    pub output: PathBuf,
    pub frames_rendered: u64,
    pub elapsed: Duration,
}
