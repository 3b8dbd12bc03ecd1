//! Composition building module
//!
//! Builds the in-memory timeline, overlay layer stack, and render
//! instructions consumed by the export engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::model::{Dimensions, OrientationInfo, TimeRange, Transform};

pub mod instructions;
pub mod layers;
pub mod overlay;
pub mod tracks;

pub use instructions::{InstructionBuilder, RenderInstructions};
pub use layers::{LayerStack, OverlayLayerBuilder, Rect};
pub use overlay::Watermark;
pub use tracks::TrackComposer;

/// Kind of media a composition track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
}

/// A derived track: one time range copied from a single source track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionTrack {
    pub kind: TrackKind,
    /// Stream index of the source track this range was copied from
    pub source_index: usize,
    /// Copied range; always starts at zero
    pub range: TimeRange,
    /// Preferred transform propagated unchanged from the source track
    pub transform: Transform,
}

/// Editable in-memory timeline built from one source asset.
///
/// Owned exclusively by one export job; partial compositions are never
/// constructed (the composer aborts on any track insertion failure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composition {
    pub source: PathBuf,
    /// Duration of the governing video track in seconds
    pub duration_secs: f64,
    pub video: CompositionTrack,
    pub audio: Option<CompositionTrack>,
    /// Stored frame size of the source video track
    pub natural_size: Dimensions,
    pub orientation: OrientationInfo,
    /// Working frame size for the export (natural size, swapped if portrait)
    pub render_size: Dimensions,
}

impl Composition {
    /// Number of tracks in the composition
    pub fn track_count(&self) -> usize {
        1 + usize::from(self.audio.is_some())
    }
}
