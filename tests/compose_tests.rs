//! Integration tests for the composition pipeline stages

use std::path::PathBuf;

use image::{Rgba, RgbaImage};

use markx_cli::compose::{
    InstructionBuilder, OverlayLayerBuilder, Rect, TrackComposer, Watermark,
};
use markx_cli::domain::model::{
    AssetInfo, AudioTrackInfo, Dimensions, Orientation, TimeRange, Transform, VideoTrackInfo,
};
use markx_cli::error::MarkXError;

// Test utilities

/// Build a probed asset description without touching the filesystem
fn test_asset(
    video: Option<VideoTrackInfo>,
    audio: Option<AudioTrackInfo>,
) -> AssetInfo {
    AssetInfo {
        path: PathBuf::from("sample.mov"),
        container: "mov".to_string(),
        duration_secs: video.as_ref().map(|v| v.duration_secs).unwrap_or(0.0),
        video,
        audio,
    }
}

fn test_video(natural_size: Dimensions, duration: f64, transform: Transform) -> VideoTrackInfo {
    VideoTrackInfo {
        index: 0,
        codec: "h264".to_string(),
        natural_size,
        frame_rate: 30.0,
        duration_secs: duration,
        transform,
    }
}

fn test_audio(duration: f64) -> AudioTrackInfo {
    AudioTrackInfo {
        index: 1,
        codec: "aac".to_string(),
        sample_rate: 48000,
        channels: 2,
        duration_secs: duration,
    }
}

/// 4:1 brand image, as the bundled asset is
fn test_watermark() -> Watermark {
    Watermark::from_rgba(RgbaImage::from_pixel(400, 100, Rgba([255, 255, 255, 200]))).unwrap()
}

// Full-pipeline stage chaining

#[test]
fn test_landscape_pipeline_produces_expected_plan() {
    // 10-second 1920x1080 landscape source, no audio
    let asset = test_asset(
        Some(test_video(
            Dimensions::new(1920, 1080),
            10.0,
            Transform::identity(),
        )),
        None,
    );

    let composition = TrackComposer::new().compose(&asset).unwrap();
    assert_eq!(composition.track_count(), 1);
    assert_eq!(composition.render_size, Dimensions::new(1920, 1080));
    assert_eq!(composition.duration_secs, 10.0);

    let watermark = test_watermark();
    let layers = OverlayLayerBuilder::new(&watermark).build(composition.render_size);
    assert_eq!(layers.video_layer, Rect::new(20.0, 20.0, 1880.0, 1040.0));
    assert_eq!(layers.overlay_layer, Rect::new(0.0, 0.0, 1920.0, 1080.0));

    let instructions = InstructionBuilder::new().build(&composition, &layers);
    assert_eq!(instructions.time_range, TimeRange::from_zero(10.0));
    assert_eq!(instructions.frame_rate, 30);
    assert_eq!(instructions.render_size, Dimensions::new(1920, 1080));
    assert!(instructions.layer_transform.transform.is_identity());
}

#[test]
fn test_portrait_pipeline_swaps_render_dimensions() {
    // Portrait phone capture: stored 1920x1080 with a right-rotation transform
    let asset = test_asset(
        Some(test_video(
            Dimensions::new(1920, 1080),
            8.0,
            Transform::rotate_right(),
        )),
        Some(test_audio(8.0)),
    );

    let composition = TrackComposer::new().compose(&asset).unwrap();
    assert_eq!(composition.track_count(), 2);
    assert_eq!(composition.orientation.orientation, Orientation::Right);
    assert!(composition.orientation.is_portrait);
    assert_eq!(composition.render_size, Dimensions::new(1080, 1920));

    let watermark = test_watermark();
    let layers = OverlayLayerBuilder::new(&watermark).build(composition.render_size);
    assert_eq!(layers.video_layer, Rect::new(20.0, 20.0, 1040.0, 1880.0));

    // The propagated transform reaches the per-track instruction unchanged
    let instructions = InstructionBuilder::new().build(&composition, &layers);
    assert_eq!(
        instructions.layer_transform.transform,
        Transform::rotate_right()
    );
    assert_eq!(instructions.layer_transform.start_secs, 0.0);
}

#[test]
fn test_overlay_image_placement_follows_aspect_ratio() {
    let watermark = test_watermark();
    let layers = OverlayLayerBuilder::new(&watermark).build(Dimensions::new(1920, 1080));

    // Full width, height from the image's own aspect, raised by 15% of height
    assert_eq!(layers.overlay_image.width, 1920.0);
    assert_eq!(layers.overlay_image.height, 480.0);
    assert_eq!(layers.overlay_image.y, -72.0);
}

#[test]
fn test_asset_without_video_never_composes() {
    let asset = test_asset(None, Some(test_audio(10.0)));
    let result = TrackComposer::new().compose(&asset);
    assert!(matches!(result, Err(MarkXError::AssetError { .. })));
}

#[test]
fn test_both_tracks_span_identical_range() {
    let asset = test_asset(
        Some(test_video(
            Dimensions::new(1280, 720),
            12.5,
            Transform::identity(),
        )),
        Some(test_audio(12.5)),
    );

    let composition = TrackComposer::new().compose(&asset).unwrap();
    let audio = composition.audio.as_ref().unwrap();

    assert_eq!(composition.video.range, TimeRange::from_zero(12.5));
    assert_eq!(audio.range, composition.video.range);
}
