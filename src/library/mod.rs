//! Media library persistence module
//!
//! Commits finished exports into a library directory. A persistence failure
//! never rolls back the export; the file stays in scratch storage and the
//! caller may retry independently.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MarkXError, MarkXResult};

/// A committed library entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedAsset {
    /// Final location within the library
    pub location: PathBuf,
    pub committed_at: DateTime<Utc>,
}

/// Port for committing an exported file into permanent storage
#[async_trait]
pub trait LibraryPersister: Send + Sync {
    /// Commit the file at `source` as a new library entry
    async fn commit(&self, source: &Path) -> MarkXResult<PersistedAsset>;
}

/// Filesystem-backed library: entries are copied into a root directory under
/// timestamped names, never overwriting an existing entry.
pub struct FsLibrary {
    root: PathBuf,
}

impl FsLibrary {
    /// Create a library over the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The library root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pick an unused entry path for a commit happening now
    fn entry_path(&self, source: &Path, committed_at: DateTime<Utc>) -> PathBuf {
        let extension = source
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| "mov".to_string());
        let stamp = committed_at.format("%Y%m%d-%H%M%S");

        let mut candidate = self.root.join(format!("watermarked-{}.{}", stamp, extension));
        let mut counter = 2u32;
        while candidate.exists() {
            candidate = self
                .root
                .join(format!("watermarked-{}-{}.{}", stamp, counter, extension));
            counter += 1;
        }
        candidate
    }
}

#[async_trait]
impl LibraryPersister for FsLibrary {
    async fn commit(&self, source: &Path) -> MarkXResult<PersistedAsset> {
        let source = source.to_path_buf();
        let root = self.root.clone();
        let committed_at = Utc::now();
        let entry = self.entry_path(&source, committed_at);

        debug!(
            "Committing {} into library as {}",
            source.display(),
            entry.display()
        );

        let location = tokio::task::spawn_blocking(move || -> MarkXResult<PathBuf> {
            std::fs::create_dir_all(&root).map_err(|e| MarkXError::PersistenceError {
                message: format!("Failed to create library root {}: {}", root.display(), e),
            })?;
            std::fs::copy(&source, &entry).map_err(|e| MarkXError::PersistenceError {
                message: format!(
                    "Failed to commit {} into library: {}",
                    source.display(),
                    e
                ),
            })?;
            Ok(entry)
        })
        .await
        .map_err(|e| MarkXError::PersistenceError {
            message: format!("Library commit task aborted: {}", e),
        })??;

        info!("Committed library entry {}", location.display());
        Ok(PersistedAsset {
            location,
            committed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commit_copies_file_into_library() {
        let scratch = tempfile::tempdir().unwrap();
        let library_root = tempfile::tempdir().unwrap();

        let source = scratch.path().join("export.mov");
        std::fs::write(&source, b"finished export").unwrap();

        let library = FsLibrary::new(library_root.path());
        let persisted = library.commit(&source).await.unwrap();

        assert!(persisted.location.exists());
        assert!(persisted.location.starts_with(library_root.path()));
        assert_eq!(std::fs::read(&persisted.location).unwrap(), b"finished export");
        // The scratch file is untouched; ownership stays with the caller
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_commit_twice_never_overwrites() {
        let scratch = tempfile::tempdir().unwrap();
        let library_root = tempfile::tempdir().unwrap();

        let source = scratch.path().join("export.mov");
        std::fs::write(&source, b"finished export").unwrap();

        let library = FsLibrary::new(library_root.path());
        let first = library.commit(&source).await.unwrap();
        let second = library.commit(&source).await.unwrap();

        assert_ne!(first.location, second.location);
        assert!(first.location.exists());
        assert!(second.location.exists());
    }

    #[tokio::test]
    async fn test_commit_missing_source_is_persistence_error() {
        let library_root = tempfile::tempdir().unwrap();
        let library = FsLibrary::new(library_root.path());

        let result = library.commit(Path::new("/nonexistent/export.mov")).await;
        assert!(matches!(result, Err(MarkXError::PersistenceError { .. })));
    }
}
