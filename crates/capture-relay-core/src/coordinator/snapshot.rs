use crate::session::{SessionState, SourceRef};

use serde::Serialize;
use uuid::Uuid;

/// Answer to a status query from a UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Coordinator state.
    pub state: SessionState,
    /// Source of the current session.
    pub source_ref: Option<SourceRef>,
    /// Correlation id of the current session.
    pub session_id: Option<Uuid>,
    /// Value of the persisted `isRecording` flag.
    pub is_recording: bool,
    /// Whether a worker context exists.
    pub worker_present: bool,
}
