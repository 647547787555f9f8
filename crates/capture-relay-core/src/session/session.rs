use crate::session::{SessionState, SourceRef};

use uuid::Uuid;

/// The coordinator's authoritative view of the recording session.
///
/// `source_ref` and `session_id` are only populated while the state is
/// `Preparing` or `Recording`; every transition to `Idle` clears them.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    source_ref: Option<SourceRef>,
    session_id: Option<Uuid>,
}

impl Session {
    /// Create an idle session.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            source_ref: None,
            session_id: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Source chosen for the current session, if any.
    pub fn source_ref(&self) -> Option<&SourceRef> {
        self.source_ref.as_ref()
    }

    /// Correlation id of the current session, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Idle -> Preparing. Returns the new session id, or `None` if not idle.
    pub(crate) fn begin_preparing(&mut self) -> Option<Uuid> {
        if self.state != SessionState::Idle {
            return None;
        }
        let id = Uuid::new_v4();
        self.state = SessionState::Preparing;
        self.session_id = Some(id);
        Some(id)
    }

    /// Whether `id` still names a session that is waiting on its start handshake.
    pub(crate) fn is_pending(&self, id: Uuid) -> bool {
        self.state == SessionState::Preparing && self.session_id == Some(id)
    }

    /// Whether `id` names the session currently recording.
    pub(crate) fn is_recording_session(&self, id: Uuid) -> bool {
        self.state == SessionState::Recording && self.session_id == Some(id)
    }

    pub(crate) fn attach_source(&mut self, source: SourceRef) {
        self.source_ref = Some(source);
    }

    /// Preparing -> Recording.
    pub(crate) fn mark_recording(&mut self) {
        self.state = SessionState::Recording;
    }

    /// Adopt a recording that the worker is already running.
    pub(crate) fn adopt_recording(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.state = SessionState::Recording;
        self.session_id = Some(id);
        id
    }

    pub(crate) fn mark_stopping(&mut self) {
        self.state = SessionState::Stopping;
    }

    /// Any state -> Idle, clearing per-session data.
    pub(crate) fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.source_ref = None;
        self.session_id = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
