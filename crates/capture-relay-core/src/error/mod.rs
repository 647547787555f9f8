use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

/// Coordination errors with source location tracking.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The platform refused to create the worker context.
    #[error("Worker context creation failed: {reason} {location}")]
    WorkerCreationFailed {
        /// Platform-reported reason.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A command could not be handed to the worker context.
    #[error("Send to worker failed: {reason} {location}")]
    SendFailed {
        /// Description of the send failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Every delivery attempt of a command failed.
    #[error("Dispatch of {kind} exhausted after {attempts} attempts {location}")]
    DispatchExhausted {
        /// Wire kind of the command that was not delivered.
        kind: &'static str,
        /// Total send attempts made.
        attempts: u32,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The worker received the command but refused it.
    #[error("Worker rejected {kind}: {reason} {location}")]
    Rejected {
        /// Wire kind of the rejected command.
        kind: &'static str,
        /// Reason reported by the worker.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Session store read or write failed.
    #[error("Session store error: {reason} {location}")]
    StoreError {
        /// Description of the store failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture engine operation failed.
    #[error("Capture error: {reason} {location}")]
    CaptureFailed {
        /// Description of the capture failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Source picker failed (not a user cancellation).
    #[error("Source selection failed: {reason} {location}")]
    PickerFailed {
        /// Description of the picker failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Artifact sink could not persist a finished recording.
    #[error("Artifact sink error: {reason} {location}")]
    ArtifactFailed {
        /// Description of the sink failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Wire message could not be encoded or decoded.
    #[error("Protocol error: {source} {location}")]
    Protocol {
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An internal channel was closed.
    #[error("Channel closed: {message} {location}")]
    ChannelClosed {
        /// Which channel closed.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

// Cannot use #[from] because it does not support extra fields.
impl From<serde_json::Error> for RelayError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        RelayError::Protocol {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

/// Result type alias using [`RelayError`].
pub type Result<T> = StdResult<T, RelayError>;
