//! Capture flow orchestration: source selection, then the start handshake.
//!
//! The coordinator runs the two halves separately so it can check, between
//! and after them, that the session it started is still the current one.

use crate::{
    RelayError,
    capture::SourcePicker,
    protocol::{Command, WorkerReply},
    session::SourceRef,
    worker::MessageDispatcher,
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Result of the source-selection step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The user picked a source.
    Selected(SourceRef),
    /// The user dismissed the picker.
    Cancelled,
    /// The picker itself failed.
    Failed(String),
}

/// Result of the start handshake with the worker.
#[derive(Debug)]
pub enum StartHandshake {
    /// The worker acknowledged the start.
    Acknowledged(WorkerReply),
    /// Delivery failed or the worker refused.
    Failed(RelayError),
}

/// Drives source selection and the `Start` handshake.
pub struct CaptureFlow {
    picker: Arc<dyn SourcePicker>,
    dispatcher: Arc<MessageDispatcher>,
    start_grace: Duration,
}

impl CaptureFlow {
    /// Create an orchestrator that asks the worker to wait `start_grace`
    /// before capturing.
    pub fn new(
        picker: Arc<dyn SourcePicker>,
        dispatcher: Arc<MessageDispatcher>,
        start_grace: Duration,
    ) -> Self {
        Self {
            picker,
            dispatcher,
            start_grace,
        }
    }

    /// Run the picker against its default target.
    #[instrument(skip(self))]
    pub async fn initiate(&self) -> SelectionOutcome {
        let target = self.picker.default_target().await;
        debug!(target = ?target, "Opening source picker");

        match self.picker.pick(target).await {
            Ok(Some(source)) => {
                info!(source = %source, "Capture source selected");
                SelectionOutcome::Selected(source)
            }
            Ok(None) => {
                info!("Source selection cancelled");
                SelectionOutcome::Cancelled
            }
            Err(e) => {
                warn!(error = %e, "Source picker failed");
                SelectionOutcome::Failed(e.to_string())
            }
        }
    }

    /// Send `Start` for `source` and wait for the worker's acknowledgement.
    #[instrument(skip(self))]
    pub async fn start_capture(&self, source: &SourceRef) -> StartHandshake {
        let command = Command::Start {
            source_ref: source.clone(),
            grace: self.start_grace,
        };

        match self.dispatcher.dispatch(&command).await {
            Ok(reply) if reply.acknowledges_start() => StartHandshake::Acknowledged(reply),
            Ok(WorkerReply::Rejected { reason }) => StartHandshake::Failed(RelayError::Rejected {
                kind: command.kind().wire_name(),
                reason,
                location: ErrorLocation::from(Location::caller()),
            }),
            Ok(other) => StartHandshake::Failed(RelayError::Rejected {
                kind: command.kind().wire_name(),
                reason: format!("unexpected reply {:?}", other),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(e) => StartHandshake::Failed(e),
        }
    }
}
