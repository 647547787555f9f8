use crate::{CoreResult, capture::Artifact, session::SourceRef};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Notifications from the capture engine to the worker that hosts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The captured stream ended on its own (e.g. native "stop sharing").
    StreamEnded,
    /// A stop completed. `artifact` is `None` when nothing was captured.
    RecordingStopped {
        /// Encoded output, if any.
        artifact: Option<Artifact>,
    },
}

/// Black-box capture engine living inside the worker context.
///
/// `stop` returns once the stop is requested; completion is reported
/// asynchronously as [`EngineEvent::RecordingStopped`].
#[async_trait]
pub trait CaptureEngine: Send + Sync {
    /// Acquire the stream behind `source`.
    async fn prepare(&mut self, source: &SourceRef) -> CoreResult<()>;

    /// Begin encoding the prepared stream.
    async fn start(&mut self) -> CoreResult<()>;

    /// Request the stop of an active capture.
    async fn stop(&mut self) -> CoreResult<()>;

    /// Drop a prepared stream that was never started.
    async fn release(&mut self);
}

/// Builds a fresh engine each time a worker context comes up.
pub trait EngineFactory: Send + Sync {
    /// Create an engine that reports on `events`.
    fn create(&self, events: mpsc::Sender<EngineEvent>) -> Box<dyn CaptureEngine>;
}
