use crate::{RelayError, worker::SINGLE_CONTEXT_ERROR, worker::WorkerPlatform};

use std::{sync::Arc, time::Duration};

use tracing::{debug, info, instrument, warn};

/// Result of [`WorkerContextManager::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// This call created the context.
    Created,
    /// The context existed, or a racing caller is creating it.
    AlreadyExists,
    /// Creation failed; nothing may be dispatched.
    Failed {
        /// Platform-reported reason.
        reason: String,
    },
}

impl EnsureOutcome {
    /// `Created` and `AlreadyExists` both mean a context is (or is about to be) there.
    pub fn is_ready(&self) -> bool {
        !matches!(self, EnsureOutcome::Failed { .. })
    }
}

/// Sole creator of the worker context.
pub struct WorkerContextManager {
    platform: Arc<dyn WorkerPlatform>,
    settle: Duration,
}

impl WorkerContextManager {
    /// `settle` is how long a freshly requested context is given to attach
    /// its message listener. The context sends no ready signal.
    pub fn new(platform: Arc<dyn WorkerPlatform>, settle: Duration) -> Self {
        Self { platform, settle }
    }

    /// Make sure a worker context exists, creating it if absent.
    #[instrument(skip(self))]
    pub async fn ensure(&self) -> EnsureOutcome {
        if self.platform.has_context().await {
            return EnsureOutcome::AlreadyExists;
        }

        match self.platform.create_context().await {
            Ok(()) => {
                info!(settle_ms = self.settle.as_millis(), "Worker context created");
                tokio::time::sleep(self.settle).await;
                EnsureOutcome::Created
            }
            Err(RelayError::WorkerCreationFailed { reason, .. })
                if reason.contains(SINGLE_CONTEXT_ERROR) =>
            {
                debug!("Worker context creation already in flight");
                tokio::time::sleep(self.settle).await;
                EnsureOutcome::AlreadyExists
            }
            Err(e) => {
                warn!(error = %e, "Worker context creation failed");
                EnsureOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Boolean form of [`ensure`](Self::ensure).
    pub async fn ensure_ready(&self) -> bool {
        self.ensure().await.is_ready()
    }

    /// Capability check. Never creates anything.
    pub async fn exists(&self) -> bool {
        self.platform.has_context().await
    }

    pub(crate) fn platform(&self) -> &Arc<dyn WorkerPlatform> {
        &self.platform
    }
}
