use crate::{CoreResult, capture::Artifact};

use std::path::PathBuf;

use async_trait::async_trait;

/// Persists finished recordings. Invoked once per stopped recording.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `artifact` and return its final location.
    async fn persist(&self, artifact: Artifact) -> CoreResult<PathBuf>;
}
