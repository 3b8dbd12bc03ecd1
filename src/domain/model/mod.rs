// Domain models - Core types and data structures

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 2D affine transform describing how a track's raw samples should be
/// rotated/mirrored for display. Only a, b, c, d participate in orientation
/// decisions; tx/ty are carried for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    /// Create a transform from its six components
    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Identity transform ("up" orientation, as recorded)
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// 90 degrees clockwise ("right" orientation)
    pub fn rotate_right() -> Self {
        Self::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0)
    }

    /// 90 degrees counter-clockwise ("left" orientation)
    pub fn rotate_left() -> Self {
        Self::new(0.0, -1.0, 1.0, 0.0, 0.0, 0.0)
    }

    /// 180 degrees ("down" orientation)
    pub fn rotate_down() -> Self {
        Self::new(-1.0, 0.0, 0.0, -1.0, 0.0, 0.0)
    }

    /// Check whether this is exactly the identity transform
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Display orientation derived from a track's preferred transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// As recorded (no rotation)
    Up,
    /// 90 degrees clockwise
    Right,
    /// 90 degrees counter-clockwise
    Left,
    /// 180 degrees
    Down,
}

/// Orientation classification result: rotation class plus portrait flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationInfo {
    pub orientation: Orientation,
    pub is_portrait: bool,
}

/// Pixel dimensions of a frame or render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions with width and height exchanged
    pub fn swapped(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Check that neither side is zero
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Half-open time range in seconds. Composition ranges always start at zero
/// and span the governing video track's duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub duration: f64,
}

impl TimeRange {
    /// Range `[0, duration)`
    pub fn from_zero(duration: f64) -> Self {
        Self {
            start: 0.0,
            duration,
        }
    }

    /// End of the range in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// A range is usable when its bounds are finite and it spans something
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.duration.is_finite() && self.start >= 0.0 && self.duration > 0.0
    }
}

/// Video track metadata resolved from a source asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoTrackInfo {
    /// Stream index within the source container
    pub index: usize,
    pub codec: String,
    /// Stored frame dimensions, before any display rotation
    pub natural_size: Dimensions,
    pub frame_rate: f64,
    pub duration_secs: f64,
    /// Preferred display transform, identity when the container carries none
    pub transform: Transform,
}

/// Audio track metadata resolved from a source asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTrackInfo {
    /// Stream index within the source container
    pub index: usize,
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
}

/// Complete probed description of a source asset. Track absence is reported
/// as `None`; enforcing "video track required" is the composer's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInfo {
    pub path: PathBuf,
    pub container: String,
    pub duration_secs: f64,
    pub video: Option<VideoTrackInfo>,
    pub audio: Option<AudioTrackInfo>,
}

impl AssetInfo {
    /// Check whether the asset carries a usable video track
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }
}
