//! Command implementations

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::app::{ExportInteractor, ExportRequest, PersistOutcome};
use crate::cli::args::{ExportArgs, InspectArgs};
use crate::compose::Watermark;
use crate::config::AppConfig;
use crate::domain::rules::classify_orientation;
use crate::library::FsLibrary;
use crate::probe::AssetProbe;

/// Execute the export command
pub async fn export(args: ExportArgs, config: AppConfig) -> Result<()> {
    let watermark_path = args.watermark.as_deref().unwrap_or(&config.watermark_image);
    let watermark = Watermark::load(watermark_path).context("Failed to load watermark image")?;

    let interactor = ExportInteractor::new(watermark, config.scratch_dir.clone())
        .with_library(Arc::new(FsLibrary::new(config.library_dir.clone())));

    let mut request = ExportRequest::new(args.input);
    if let Some(output) = args.output {
        request = request.with_destination(output);
    }
    if args.library {
        request = request.with_library_save();
    }

    let response = interactor
        .execute(request)
        .await
        .context("Export failed")?;

    info!(
        "Exported {} ({} @ {:.3}s, {} frame(s)) in {:.2}s",
        response.output.display(),
        response.render_size,
        response.duration_secs,
        response.frames_rendered,
        response.processing_time.as_secs_f64()
    );
    println!("{}", response.output.display());

    match response.persisted {
        PersistOutcome::Saved(asset) => {
            println!("Saved to library: {}", asset.location.display());
        }
        PersistOutcome::Failed(reason) => {
            eprintln!(
                "Library save failed ({}); the exported file remains at {}",
                reason,
                response.output.display()
            );
        }
        PersistOutcome::Skipped => {}
    }

    Ok(())
}

/// Execute the inspect command
pub fn inspect(args: InspectArgs) -> Result<()> {
    let probe = AssetProbe::new();
    let asset = probe
        .probe(&args.input)
        .context("Failed to inspect input file")?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&asset).context("Failed to serialize asset info")?;
        println!("{}", json);
    } else {
        println!("Asset Information");
        println!("=================");
        println!("File: {}", asset.path.display());
        println!("Container: {}", asset.container);
        println!("Duration: {:.3}s", asset.duration_secs);
        println!();

        match &asset.video {
            Some(video) => {
                let orientation = classify_orientation(&video.transform);
                println!("Video Track:");
                println!("  Codec: {}", video.codec);
                println!("  Natural size: {}", video.natural_size);
                println!("  Frame rate: {:.2} fps", video.frame_rate);
                println!(
                    "  Orientation: {:?}{}",
                    orientation.orientation,
                    if orientation.is_portrait {
                        " (portrait)"
                    } else {
                        ""
                    }
                );
            }
            None => println!("Video Track: none"),
        }
        println!();

        match &asset.audio {
            Some(audio) => {
                println!("Audio Track:");
                println!("  Codec: {}", audio.codec);
                println!("  Sample rate: {} Hz", audio.sample_rate);
                println!("  Channels: {}", audio.channels);
            }
            None => println!("Audio Track: none"),
        }
    }

    Ok(())
}
