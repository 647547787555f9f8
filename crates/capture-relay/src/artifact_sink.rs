//! Moves finished recordings into the recordings directory.

use capture_relay_core::{Artifact, ArtifactSink, CoreResult, RelayError};

use std::{panic::Location, path::PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// `{prefix}_{YYYY-MM-DDTHH-MM-SS}.{ext}`
pub(crate) fn artifact_file_name(prefix: &str, at: DateTime<Local>, extension: &str) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y-%m-%dT%H-%M-%S"), extension)
}

/// Artifact sink writing into one directory.
pub struct DirectoryArtifactSink {
    directory: PathBuf,
    prefix: String,
}

impl DirectoryArtifactSink {
    /// Save recordings into `directory`, named with `prefix`.
    pub fn new(directory: PathBuf, prefix: String) -> Self {
        Self { directory, prefix }
    }

    /// First free path for `file_name`, suffixing `-1`, `-2`, ... on collision.
    async fn free_path(&self, file_name: &str, extension: &str) -> PathBuf {
        let candidate = self.directory.join(file_name);
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }

        let stem = file_name.trim_end_matches(&format!(".{}", extension));
        let mut n = 1u32;
        loop {
            let candidate = self.directory.join(format!("{}-{}.{}", stem, n, extension));
            if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[async_trait]
impl ArtifactSink for DirectoryArtifactSink {
    #[instrument(skip(self), fields(size_bytes = artifact.size_bytes))]
    async fn persist(&self, artifact: Artifact) -> CoreResult<PathBuf> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| artifact_failed(format!("cannot create {:?}: {}", self.directory, e)))?;

        let extension = artifact.extension();
        let file_name = artifact_file_name(&self.prefix, Local::now(), extension);
        let target = self.free_path(&file_name, extension).await;

        if let Err(e) = tokio::fs::rename(&artifact.path, &target).await {
            // Staging and target may sit on different filesystems.
            debug!(error = %e, "Rename failed, copying instead");
            tokio::fs::copy(&artifact.path, &target)
                .await
                .map_err(|e| artifact_failed(format!("cannot write {:?}: {}", target, e)))?;
            if let Err(e) = tokio::fs::remove_file(&artifact.path).await {
                debug!(error = %e, path = ?artifact.path, "Staging file left behind");
            }
        }

        info!(path = ?target, "Recording stored");
        Ok(target)
    }
}

#[track_caller]
fn artifact_failed(reason: String) -> RelayError {
    RelayError::ArtifactFailed {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
