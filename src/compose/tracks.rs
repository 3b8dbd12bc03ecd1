//! Track composition implementation

use tracing::{debug, info};

use crate::compose::{Composition, CompositionTrack, TrackKind};
use crate::domain::model::{AssetInfo, AudioTrackInfo, TimeRange, Transform, VideoTrackInfo};
use crate::domain::rules::{classify_orientation, render_size};
use crate::error::{MarkXError, MarkXResult};

/// Containers routinely report audio a few frames shorter than video; a
/// shortfall within this tolerance is not treated as corruption.
const AUDIO_RANGE_TOLERANCE_SECS: f64 = 0.25;

/// Builds a composition by copying a source asset's tracks over the range
/// `[0, video duration)`.
pub struct TrackComposer;

impl TrackComposer {
    /// Create a new track composer
    pub fn new() -> Self {
        Self
    }

    /// Compose a timeline from a probed asset.
    ///
    /// The video track is required and governs the copied range; audio is
    /// optional and spans the identical range when present. Any insertion
    /// failure aborts the whole operation.
    pub fn compose(&self, asset: &AssetInfo) -> MarkXResult<Composition> {
        let video = asset.video.as_ref().ok_or_else(|| MarkXError::AssetError {
            message: format!("No usable video track in {}", asset.path.display()),
        })?;

        let range = TimeRange::from_zero(video.duration_secs);
        let video_track = Self::insert_video_range(video, range)?;

        let audio_track = match &asset.audio {
            Some(audio) => Some(Self::insert_audio_range(audio, range)?),
            None => {
                debug!("No audio track; composing silent video");
                None
            }
        };

        let orientation = classify_orientation(&video.transform);
        let size = render_size(video.natural_size, &orientation);

        info!(
            "Composed {} track(s) over [0, {:.3}s), render size {}",
            1 + usize::from(audio_track.is_some()),
            range.duration,
            size
        );

        Ok(Composition {
            source: asset.path.clone(),
            duration_secs: range.duration,
            video: video_track,
            audio: audio_track,
            natural_size: video.natural_size,
            orientation,
            render_size: size,
        })
    }

    /// Copy the governing range from the source video track
    fn insert_video_range(
        video: &VideoTrackInfo,
        range: TimeRange,
    ) -> MarkXResult<CompositionTrack> {
        if !range.is_valid() {
            return Err(MarkXError::CompositionError {
                message: format!(
                    "Cannot insert video time range: invalid duration {:.3}s",
                    video.duration_secs
                ),
            });
        }
        if !video.natural_size.is_valid() {
            return Err(MarkXError::CompositionError {
                message: format!(
                    "Cannot insert video time range: degenerate frame size {}",
                    video.natural_size
                ),
            });
        }

        Ok(CompositionTrack {
            kind: TrackKind::Video,
            source_index: video.index,
            range,
            transform: video.transform,
        })
    }

    /// Copy the identical range into a companion audio track
    fn insert_audio_range(
        audio: &AudioTrackInfo,
        range: TimeRange,
    ) -> MarkXResult<CompositionTrack> {
        if !audio.duration_secs.is_finite() || audio.duration_secs <= 0.0 {
            return Err(MarkXError::CompositionError {
                message: format!(
                    "Cannot insert audio time range: invalid duration {:.3}s",
                    audio.duration_secs
                ),
            });
        }
        if audio.duration_secs + AUDIO_RANGE_TOLERANCE_SECS < range.end() {
            return Err(MarkXError::CompositionError {
                message: format!(
                    "Audio track ({:.3}s) does not cover the video range ({:.3}s)",
                    audio.duration_secs,
                    range.end()
                ),
            });
        }

        Ok(CompositionTrack {
            kind: TrackKind::Audio,
            source_index: audio.index,
            range,
            transform: Transform::identity(),
        })
    }
}

impl Default for TrackComposer {
    fn default() -> Self {
        Self::new()
    }
}
