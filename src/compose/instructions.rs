//! Render instruction construction

use serde::{Deserialize, Serialize};

use crate::compose::layers::LayerStack;
use crate::compose::Composition;
use crate::domain::model::{Dimensions, TimeRange, Transform};

/// Fixed render frame rate in frames per second
pub const RENDER_FRAME_RATE: u32 = 30;

/// Per-track transform instruction: the source track's preferred transform,
/// applied from the given time so the exported frames respect the original
/// camera orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTransformInstruction {
    /// Stream index of the composition's video track
    pub source_index: usize,
    pub transform: Transform,
    /// Time at which the transform takes effect; always zero
    pub start_secs: f64,
}

/// Complete render instruction set for one export job
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderInstructions {
    /// Instruction span; always `[0, composition duration)`
    pub time_range: TimeRange,
    pub layer_transform: LayerTransformInstruction,
    pub frame_rate: u32,
    pub render_size: Dimensions,
}

/// Builds the render instruction set from a composition and its layer stack
pub struct InstructionBuilder;

impl InstructionBuilder {
    /// Create a new instruction builder
    pub fn new() -> Self {
        Self
    }

    /// Build the instruction set. Pure construction; no failure conditions.
    pub fn build(&self, composition: &Composition, layers: &LayerStack) -> RenderInstructions {
        RenderInstructions {
            time_range: TimeRange::from_zero(composition.duration_secs),
            layer_transform: LayerTransformInstruction {
                source_index: composition.video.source_index,
                transform: composition.video.transform,
                start_secs: 0.0,
            },
            frame_rate: RENDER_FRAME_RATE,
            render_size: layers.canvas,
        }
    }
}

impl Default for InstructionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
