use crate::{
    session::SessionState,
    status::{EventOrigin, StatusEvent},
};

use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Fan-out of status events to UI observers.
///
/// Sending never fails from the coordinator's point of view: with no
/// subscribers the event is simply dropped.
#[derive(Debug, Clone)]
pub struct StatusBroadcaster {
    tx: broadcast::Sender<StatusEvent>,
}

impl StatusBroadcaster {
    /// Create a broadcaster buffering up to `capacity` events per lagging observer.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.tx.subscribe()
    }

    /// Announce a state transition.
    pub fn transition(&self, state: SessionState, message: impl Into<String>) {
        self.emit(StatusEvent {
            state,
            message: message.into(),
            origin: EventOrigin::Transition,
        });
    }

    /// Relay a worker status line without a state change.
    pub fn notice(&self, state: SessionState, message: impl Into<String>) {
        self.emit(StatusEvent {
            state,
            message: message.into(),
            origin: EventOrigin::Worker,
        });
    }

    fn emit(&self, event: StatusEvent) {
        debug!(state = %event.state, message = %event.message, origin = ?event.origin, "Status");
        if self.tx.send(event).is_err() {
            trace!("No status observers");
        }
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}
