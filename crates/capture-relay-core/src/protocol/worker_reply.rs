use serde::{Deserialize, Serialize};

/// Synchronous response from the worker's message listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum WorkerReply {
    /// Source prepared; capture begins after the grace delay.
    Starting,
    /// A start arrived while already capturing. Nothing changed.
    AlreadyRecording,
    /// Capture stopped, or was not running.
    Stopped,
    /// The command was received but could not be honoured.
    Rejected {
        /// Why the worker refused.
        reason: String,
    },
    /// Status query answer: not capturing.
    Idle,
    /// Status query answer: capturing.
    Recording,
}

impl WorkerReply {
    /// Whether this reply acknowledges a successful start.
    pub fn acknowledges_start(&self) -> bool {
        matches!(self, WorkerReply::Starting | WorkerReply::AlreadyRecording)
    }
}
