//! Scratch path utilities

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::MarkXResult;

/// Generate a fresh destination path inside the scratch directory.
///
/// The directory is created if needed and the returned path is never
/// occupied at selection time. Callers own the path from here on.
pub fn scratch_output_path(scratch_dir: &Path, extension: &str) -> MarkXResult<PathBuf> {
    std::fs::create_dir_all(scratch_dir)?;

    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let base = format!("watermarked-{}-{}", stamp, std::process::id());

    let mut candidate = scratch_dir.join(format!("{}.{}", base, extension));
    let mut counter = 2u32;
    while candidate.exists() {
        candidate = scratch_dir.join(format!("{}-{}.{}", base, counter, extension));
        counter += 1;
    }
    Ok(candidate)
}
