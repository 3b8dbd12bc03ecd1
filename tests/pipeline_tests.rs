//! Integration tests for the export pipeline and library persistence

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use markx_cli::app::{ExportInteractor, ExportRequest};
use markx_cli::compose::{
    InstructionBuilder, OverlayLayerBuilder, TrackComposer, Watermark,
};
use markx_cli::domain::model::{AssetInfo, Dimensions, Transform, VideoTrackInfo};
use markx_cli::engine::{ExportJob, ExportPreset, Exporter};
use markx_cli::error::MarkXError;
use markx_cli::library::{FsLibrary, LibraryPersister};

// Test utilities

fn test_watermark() -> Watermark {
    Watermark::from_rgba(RgbaImage::from_pixel(400, 100, Rgba([255, 255, 255, 200]))).unwrap()
}

/// Assemble a complete export job around a source path, without probing it
fn test_job(source: &Path, destination: PathBuf) -> ExportJob {
    let asset = AssetInfo {
        path: source.to_path_buf(),
        container: "mov".to_string(),
        duration_secs: 2.0,
        video: Some(VideoTrackInfo {
            index: 0,
            codec: "h264".to_string(),
            natural_size: Dimensions::new(640, 360),
            frame_rate: 30.0,
            duration_secs: 2.0,
            transform: Transform::identity(),
        }),
        audio: None,
    };

    let watermark = Arc::new(test_watermark());
    let composition = TrackComposer::new().compose(&asset).unwrap();
    let layers = OverlayLayerBuilder::new(&watermark).build(composition.render_size);
    let instructions = InstructionBuilder::new().build(&composition, &layers);

    ExportJob {
        composition,
        layers,
        instructions,
        watermark,
        destination,
        preset: ExportPreset::Highest,
    }
}

// Destination ownership and cleanup

#[tokio::test]
async fn test_undeletable_destination_fails_before_rendering() {
    // A directory occupies the destination path: cleanup cannot remove it.
    // The job must fail with IoError, proving the render never started (a
    // started render would surface ExportError for the missing source).
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("occupied.mov");
    std::fs::create_dir(&destination).unwrap();

    let job = test_job(Path::new("/nonexistent/source.mov"), destination.clone());
    let result = Exporter::new().export(job).await;

    assert!(matches!(result, Err(MarkXError::IoError(_))));
    assert!(destination.exists());
}

#[tokio::test]
async fn test_missing_source_surfaces_export_error_after_cleanup() {
    // With a writable destination, cleanup succeeds and the failure comes
    // from the render stage instead.
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("out.mov");
    std::fs::write(&destination, b"stale file").unwrap();

    let job = test_job(Path::new("/nonexistent/source.mov"), destination.clone());
    let result = Exporter::new().export(job).await;

    assert!(matches!(result, Err(MarkXError::ExportError { .. })));
    // The stale file was removed during preparation and never rewritten
    assert!(!destination.exists());
}

// Interactor failure paths

#[tokio::test]
async fn test_interactor_rejects_missing_input() {
    let scratch = tempfile::tempdir().unwrap();
    let interactor = ExportInteractor::new(test_watermark(), scratch.path());

    let result = interactor
        .execute(ExportRequest::new("/nonexistent/input.mov"))
        .await;

    assert!(matches!(result, Err(MarkXError::AssetError { .. })));
}

// Library persistence

#[tokio::test]
async fn test_library_commit_retains_scratch_file() {
    let scratch = tempfile::tempdir().unwrap();
    let library_root = tempfile::tempdir().unwrap();

    let export = scratch.path().join("watermarked.mov");
    std::fs::write(&export, b"export bytes").unwrap();

    let library = FsLibrary::new(library_root.path());
    let persisted = library.commit(&export).await.unwrap();

    assert!(persisted.location.exists());
    assert!(export.exists());
}

// End-to-end render scenarios (require a real sample video)

/// Sample file checked by the end-to-end tests below
const SAMPLE_VIDEO: &str = "sample video.mov";

#[tokio::test]
#[ignore] // Ignored by default since it requires real video files
async fn test_full_export_workflow() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return; // Skip if sample file not available
    }

    markx_cli::init().unwrap();

    let scratch = tempfile::tempdir().unwrap();
    let interactor = ExportInteractor::new(test_watermark(), scratch.path());

    let response = interactor
        .execute(ExportRequest::new(SAMPLE_VIDEO))
        .await
        .unwrap();

    assert!(response.output.exists());
    assert_eq!(response.output.extension().unwrap(), "mov");
    assert!(response.frames_rendered > 0);
}

#[tokio::test]
#[ignore] // Ignored by default since it requires real video files
async fn test_repeated_export_to_same_destination() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    markx_cli::init().unwrap();

    let scratch = tempfile::tempdir().unwrap();
    let destination = scratch.path().join("repeat.mov");
    let interactor = ExportInteractor::new(test_watermark(), scratch.path());

    // The second run must remove the first run's file and succeed; a
    // "file exists" failure here would break idempotent re-invocation.
    for _ in 0..2 {
        let response = interactor
            .execute(ExportRequest::new(SAMPLE_VIDEO).with_destination(&destination))
            .await
            .unwrap();
        assert_eq!(response.output, destination);
        assert!(destination.exists());
    }
}
