// Export interactor - Orchestrates the watermark export use case

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::compose::{InstructionBuilder, OverlayLayerBuilder, TrackComposer, Watermark};
use crate::domain::model::Dimensions;
use crate::engine::{ExportJob, ExportPreset, Exporter, OUTPUT_CONTAINER_EXT};
use crate::error::{MarkXError, MarkXResult};
use crate::library::{LibraryPersister, PersistedAsset};
use crate::probe::AssetProbe;
use crate::utils::path::scratch_output_path;

/// Request for one watermark export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Source video file
    pub input: PathBuf,
    /// Destination hint; a fresh unique scratch path is generated when absent
    pub destination: Option<PathBuf>,
    /// Commit the finished file into the library after export
    pub save_to_library: bool,
}

impl ExportRequest {
    /// Create a request exporting to a generated scratch path
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            destination: None,
            save_to_library: false,
        }
    }

    /// Export to an explicit destination path
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Commit the finished file into the library
    pub fn with_library_save(mut self) -> Self {
        self.save_to_library = true;
        self
    }
}

/// Outcome of the optional library commit, reported separately from the
/// export itself: a failed commit never invalidates the exported file.
#[derive(Debug, Clone)]
pub enum PersistOutcome {
    /// Commit succeeded
    Saved(PersistedAsset),
    /// Commit failed; the exported file remains in scratch storage
    Failed(String),
    /// No commit was requested or no library is configured
    Skipped,
}

/// Response from a completed export
#[derive(Debug, Clone)]
pub struct ExportResponse {
    pub output: PathBuf,
    pub render_size: Dimensions,
    pub duration_secs: f64,
    pub frames_rendered: u64,
    pub persisted: PersistOutcome,
    pub processing_time: Duration,
}

/// Interactor running the full pipeline for one source asset:
/// probe -> compose -> layers -> instructions -> export -> optional persist.
///
/// Stages execute strictly sequentially within a job; independent jobs share
/// nothing but this interactor's immutable collaborators.
pub struct ExportInteractor {
    probe: Arc<AssetProbe>,
    composer: TrackComposer,
    watermark: Arc<Watermark>,
    exporter: Exporter,
    library: Option<Arc<dyn LibraryPersister>>,
    scratch_dir: PathBuf,
}

impl ExportInteractor {
    /// Create a new interactor over a loaded watermark image
    pub fn new(watermark: Watermark, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            probe: Arc::new(AssetProbe::new()),
            composer: TrackComposer::new(),
            watermark: Arc::new(watermark),
            exporter: Exporter::new(),
            library: None,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Attach a library persister for post-export commits
    pub fn with_library(mut self, library: Arc<dyn LibraryPersister>) -> Self {
        self.library = Some(library);
        self
    }

    /// Execute one export end to end
    pub async fn execute(&self, request: ExportRequest) -> MarkXResult<ExportResponse> {
        let started = std::time::Instant::now();
        info!("Starting watermark export for {}", request.input.display());

        // Probe touches the container on disk; keep it off the async threads
        let probe = Arc::clone(&self.probe);
        let input = request.input.clone();
        let asset = tokio::task::spawn_blocking(move || probe.probe(&input))
            .await
            .map_err(|e| MarkXError::AssetError {
                message: format!("Probe task aborted: {}", e),
            })??;

        let composition = self.composer.compose(&asset)?;
        let layers = OverlayLayerBuilder::new(&self.watermark).build(composition.render_size);
        let instructions = InstructionBuilder::new().build(&composition, &layers);

        let destination = match request.destination {
            Some(path) => path,
            None => scratch_output_path(&self.scratch_dir, OUTPUT_CONTAINER_EXT)?,
        };

        let render_size = composition.render_size;
        let duration_secs = composition.duration_secs;

        let job = ExportJob {
            composition,
            layers,
            instructions,
            watermark: Arc::clone(&self.watermark),
            destination,
            preset: ExportPreset::Highest,
        };

        let report = self.exporter.export(job).await?;
        let persisted = self.persist(&report.output, request.save_to_library).await;

        info!(
            "Watermark export finished in {:.2}s: {}",
            started.elapsed().as_secs_f64(),
            report.output.display()
        );

        Ok(ExportResponse {
            output: report.output,
            render_size,
            duration_secs,
            frames_rendered: report.frames_rendered,
            persisted,
            processing_time: started.elapsed(),
        })
    }

    /// Commit the finished file when requested and a library is configured.
    /// Failures are reported in the response, never propagated: the export
    /// already succeeded and its file stays available for a retry.
    async fn persist(&self, output: &std::path::Path, requested: bool) -> PersistOutcome {
        if !requested {
            return PersistOutcome::Skipped;
        }
        let library = match &self.library {
            Some(library) => library,
            None => {
                warn!("Library save requested but no library is configured");
                return PersistOutcome::Skipped;
            }
        };

        match library.commit(output).await {
            Ok(persisted) => PersistOutcome::Saved(persisted),
            Err(e) => {
                warn!("Library commit failed, export retained at {}: {}", output.display(), e);
                PersistOutcome::Failed(e.to_string())
            }
        }
    }
}
