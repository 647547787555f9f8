use crate::session::SessionState;

use serde::Serialize;

/// Who produced a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventOrigin {
    /// A coordinator state transition.
    Transition,
    /// A status line relayed from the worker. The state did not change.
    Worker,
}

/// One update delivered to UI observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    /// Coordinator state after the event.
    pub state: SessionState,
    /// Human-readable status line.
    pub message: String,
    /// Transition or relayed worker notice.
    pub origin: EventOrigin,
}
