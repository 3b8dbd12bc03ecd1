//! Overlay layer stack construction

use serde::{Deserialize, Serialize};

use crate::compose::overlay::Watermark;
use crate::domain::model::Dimensions;

/// Inset applied to every side of the video layer, producing the framed
/// border effect around the rendered video.
pub const VIDEO_FRAME_INSET: f64 = 20.0;

/// Fraction of the brand image's own height it is raised above the top edge,
/// leaving it deliberately part-cropped.
pub const OVERLAY_RISE_FACTOR: f64 = 0.15;

/// Axis-aligned rectangle in render coordinates (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Ordered visual layers composited bottom-to-top into each rendered frame.
///
/// Owned by exactly one export job and discarded when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    /// Full working frame the layers are placed within
    pub canvas: Dimensions,
    /// Inset rectangle the source video is rendered into
    pub video_layer: Rect,
    /// Full-canvas layer hosting the brand image
    pub overlay_layer: Rect,
    /// Placement of the brand image within the overlay layer
    pub overlay_image: Rect,
}

/// Builds the layer stack for a given render size.
///
/// Pure layout arithmetic; the watermark contributes only its aspect ratio.
pub struct OverlayLayerBuilder<'a> {
    watermark: &'a Watermark,
}

impl<'a> OverlayLayerBuilder<'a> {
    /// Create a new layer builder over the loaded brand image
    pub fn new(watermark: &'a Watermark) -> Self {
        Self { watermark }
    }

    /// Build the layer stack for the given render dimensions
    pub fn build(&self, render_size: Dimensions) -> LayerStack {
        let width = render_size.width as f64;
        let height = render_size.height as f64;

        let video_layer = Rect::new(
            VIDEO_FRAME_INSET,
            VIDEO_FRAME_INSET,
            (width - 2.0 * VIDEO_FRAME_INSET).max(0.0),
            (height - 2.0 * VIDEO_FRAME_INSET).max(0.0),
        );

        let overlay_layer = Rect::new(0.0, 0.0, width, height);

        let image_height = width / self.watermark.aspect_ratio();
        let overlay_image = Rect::new(
            0.0,
            -(image_height * OVERLAY_RISE_FACTOR),
            width,
            image_height,
        );

        LayerStack {
            canvas: render_size,
            video_layer,
            overlay_layer,
            overlay_image,
        }
    }
}
