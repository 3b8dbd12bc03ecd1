//! Asset inspection implementation

use std::path::Path;

use tracing::{debug, info};

use crate::domain::model::{AssetInfo, AudioTrackInfo, Dimensions, Transform, VideoTrackInfo};
use crate::error::{MarkXError, MarkXResult};

/// Probe for resolving a source asset's tracks, duration, and display
/// transform via FFmpeg.
pub struct AssetProbe;

impl AssetProbe {
    /// Create a new asset probe
    pub fn new() -> Self {
        Self
    }

    /// Probe a source file and resolve its track metadata.
    ///
    /// Track absence is reported as `None` rather than an error; an
    /// unreadable file or container fails with `AssetError`.
    pub fn probe(&self, path: &Path) -> MarkXResult<AssetInfo> {
        info!("Probing source asset: {}", path.display());

        if !path.exists() {
            return Err(MarkXError::AssetError {
                message: format!("Source file not found: {}", path.display()),
            });
        }

        let input = ffmpeg_next::format::input(&path).map_err(|e| MarkXError::AssetError {
            message: format!("Failed to open source {}: {}", path.display(), e),
        })?;

        let container = input.format().name().to_string();
        let container_duration = Self::container_duration_secs(&input);

        let video = match input.streams().best(ffmpeg_next::media::Type::Video) {
            Some(stream) => Some(Self::video_track_info(&stream, container_duration)?),
            None => None,
        };

        let audio = match input.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => Some(Self::audio_track_info(&stream, container_duration)?),
            None => None,
        };

        let asset = AssetInfo {
            path: path.to_path_buf(),
            container,
            duration_secs: container_duration,
            video,
            audio,
        };

        debug!(
            "Probe complete: video={}, audio={}, duration={:.3}s",
            asset.video.is_some(),
            asset.audio.is_some(),
            asset.duration_secs
        );
        Ok(asset)
    }

    /// Container duration in seconds, zero when the header carries none
    fn container_duration_secs(input: &ffmpeg_next::format::context::Input) -> f64 {
        let raw = input.duration();
        if raw <= 0 {
            return 0.0;
        }
        raw as f64 / ffmpeg_next::ffi::AV_TIME_BASE as f64
    }

    /// Resolve video track metadata from its stream
    fn video_track_info(
        stream: &ffmpeg_next::format::stream::Stream,
        fallback_duration: f64,
    ) -> MarkXResult<VideoTrackInfo> {
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| MarkXError::AssetError {
                message: format!("Failed to read video stream parameters: {}", e),
            })?
            .decoder()
            .video()
            .map_err(|e| MarkXError::AssetError {
                message: format!("Failed to resolve video decoder: {}", e),
            })?;

        let frame_rate = {
            let rate = stream.avg_frame_rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        Ok(VideoTrackInfo {
            index: stream.index(),
            codec: format!("{:?}", decoder.id()).to_lowercase(),
            natural_size: Dimensions::new(decoder.width(), decoder.height()),
            frame_rate,
            duration_secs: Self::stream_duration_secs(stream, fallback_duration),
            transform: Self::display_transform(stream),
        })
    }

    /// Resolve audio track metadata from its stream
    fn audio_track_info(
        stream: &ffmpeg_next::format::stream::Stream,
        fallback_duration: f64,
    ) -> MarkXResult<AudioTrackInfo> {
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| MarkXError::AssetError {
                message: format!("Failed to read audio stream parameters: {}", e),
            })?
            .decoder()
            .audio()
            .map_err(|e| MarkXError::AssetError {
                message: format!("Failed to resolve audio decoder: {}", e),
            })?;

        Ok(AudioTrackInfo {
            index: stream.index(),
            codec: format!("{:?}", decoder.id()).to_lowercase(),
            sample_rate: decoder.rate(),
            channels: decoder.channels(),
            duration_secs: Self::stream_duration_secs(stream, fallback_duration),
        })
    }

    /// Stream duration in seconds, falling back to the container duration
    /// when the stream header does not carry its own.
    fn stream_duration_secs(
        stream: &ffmpeg_next::format::stream::Stream,
        fallback_duration: f64,
    ) -> f64 {
        let raw = stream.duration();
        let time_base = stream.time_base();
        if raw > 0 && time_base.denominator() != 0 {
            raw as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
        } else {
            fallback_duration
        }
    }

    /// Extract the preferred display transform from display-matrix side
    /// data, identity when the stream carries none.
    fn display_transform(stream: &ffmpeg_next::format::stream::Stream) -> Transform {
        for side_data in stream.side_data() {
            if side_data.kind() == ffmpeg_next::codec::packet::side_data::Type::DisplayMatrix {
                if let Some(transform) = Self::parse_display_matrix(side_data.data()) {
                    debug!("Display matrix found on stream {}", stream.index());
                    return transform;
                }
            }
        }
        Transform::identity()
    }

    /// Decode a 3x3 fixed-point display matrix into an affine transform.
    ///
    /// The rotation/scale cells are 16.16 fixed point; the matrix is stored
    /// row-major as nine 32-bit integers.
    fn parse_display_matrix(data: &[u8]) -> Option<Transform> {
        if data.len() < 36 {
            return None;
        }

        let cell = |i: usize| -> f64 {
            let offset = i * 4;
            let bytes = [
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ];
            i32::from_ne_bytes(bytes) as f64 / 65536.0
        };

        Some(Transform::new(
            cell(0),
            cell(1),
            cell(3),
            cell(4),
            cell(6),
            cell(7),
        ))
    }
}

impl Default for AssetProbe {
    fn default() -> Self {
        Self::new()
    }
}
