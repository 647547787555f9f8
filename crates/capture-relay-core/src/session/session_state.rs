use serde::{Deserialize, Serialize};

/// Lifecycle of a recording session.
///
/// `Idle` is both the initial state and the state re-entered after every
/// session. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// No session in progress.
    #[default]
    Idle,
    /// Source selection or start handshake in flight.
    Preparing,
    /// Worker acknowledged the start; capture is running.
    Recording,
    /// A stop trigger is being processed.
    Stopping,
}

impl SessionState {
    /// Whether the persisted `isRecording` flag should read `true`.
    pub fn is_recording(self) -> bool {
        matches!(self, SessionState::Recording)
    }

    /// Whether a session currently owns a source reference.
    pub fn holds_source(self) -> bool {
        matches!(self, SessionState::Preparing | SessionState::Recording)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "Idle",
            SessionState::Preparing => "Preparing",
            SessionState::Recording => "Recording",
            SessionState::Stopping => "Stopping",
        };
        f.write_str(name)
    }
}
