//! Export driver implementation

use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::engine::{renderer, ExportJob, ExportPhase, ExportReport};
use crate::error::{MarkXError, MarkXResult};
use crate::probe::AssetProbe;

/// Drives one export job to a terminal outcome.
///
/// The job runs as a single asynchronous task: the destination is cleaned up
/// first, the render executes on the blocking pool while the caller
/// suspends, and the finished file is verified before the report is
/// returned. No retry is attempted at any stage.
pub struct Exporter;

impl Exporter {
    /// Create a new exporter
    pub fn new() -> Self {
        Self
    }

    /// Execute one export job to completion.
    ///
    /// Re-invoking with the same destination is safe: the prior file is
    /// removed before rendering starts. Concurrent jobs must not share a
    /// destination path.
    pub async fn export(&self, job: ExportJob) -> MarkXResult<ExportReport> {
        let started = Instant::now();
        let destination = job.destination.clone();
        let mut phase = advance(ExportPhase::Created, ExportPhase::Preparing);

        info!("Starting export to {}", destination.display());

        match self.run(job, &mut phase).await {
            Ok(report) => {
                info!(
                    "Export succeeded in {:.2}s: {}",
                    started.elapsed().as_secs_f64(),
                    report.output.display()
                );
                Ok(ExportReport {
                    elapsed: started.elapsed(),
                    ..report
                })
            }
            Err(e) => {
                advance(phase, ExportPhase::Failed);
                error!("Export failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run(&self, job: ExportJob, phase: &mut ExportPhase) -> MarkXResult<ExportReport> {
        let destination = job.destination.clone();

        Self::prepare_destination(&destination)?;
        *phase = advance(*phase, ExportPhase::Rendering);

        let stats = tokio::task::spawn_blocking(move || renderer::render(&job))
            .await
            .map_err(|e| MarkXError::ExportError {
                message: format!("Render task aborted: {}", e),
            })??;

        self.verify_output(&destination)?;
        *phase = advance(*phase, ExportPhase::Succeeded);

        Ok(ExportReport {
            phase: *phase,
            output: destination,
            frames_rendered: stats.frames,
            elapsed: std::time::Duration::ZERO,
        })
    }

    /// Remove any pre-existing file at the destination path.
    ///
    /// An absent file is not an error; any other removal failure aborts the
    /// job before rendering work begins.
    fn prepare_destination(destination: &Path) -> MarkXResult<()> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match fs::remove_file(destination) {
            Ok(()) => {
                debug!("Removed pre-existing file at {}", destination.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MarkXError::IoError(e)),
        }
    }

    /// Re-probe the finished file to confirm it is a playable video
    fn verify_output(&self, destination: &Path) -> MarkXResult<()> {
        let info = AssetProbe::new()
            .probe(destination)
            .map_err(|e| MarkXError::ExportError {
                message: format!("Export verification failed: {}", e),
            })?;

        if !info.has_video() {
            return Err(MarkXError::ExportError {
                message: format!(
                    "Export verification failed: no video stream in {}",
                    destination.display()
                ),
            });
        }
        if info.duration_secs <= 0.0 {
            return Err(MarkXError::ExportError {
                message: format!(
                    "Export verification failed: empty duration in {}",
                    destination.display()
                ),
            });
        }

        debug!(
            "Verified output {}: {:.3}s",
            destination.display(),
            info.duration_secs
        );
        Ok(())
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Log and perform one phase transition
fn advance(from: ExportPhase, to: ExportPhase) -> ExportPhase {
    debug!("Export phase: {:?} -> {:?}", from, to);
    to
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_destination_removes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.mov");
        fs::write(&destination, b"stale export").unwrap();

        Exporter::prepare_destination(&destination).unwrap();
        assert!(!destination.exists());
    }

    #[test]
    fn test_prepare_destination_accepts_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("fresh.mov");

        Exporter::prepare_destination(&destination).unwrap();
        assert!(!destination.exists());
    }

    #[test]
    fn test_prepare_destination_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("nested/deeper/out.mov");

        Exporter::prepare_destination(&destination).unwrap();
        assert!(destination.parent().unwrap().is_dir());
    }

    #[test]
    fn test_prepare_destination_undeletable_path_is_io_error() {
        // A directory at the destination path cannot be removed as a file
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("occupied.mov");
        fs::create_dir(&destination).unwrap();

        let result = Exporter::prepare_destination(&destination);
        assert!(matches!(result, Err(MarkXError::IoError(_))));
        assert!(destination.exists());
    }
}
