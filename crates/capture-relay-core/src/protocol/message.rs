use crate::{
    CoreResult,
    protocol::Command,
    session::SourceRef,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// JSON message carried on the command channel.
///
/// Serialized as `{"type": "START_RECORDING", "sourceRef": ..., "graceMs": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Message {
    /// Start a recording. From a UI surface the payload is ignored and the
    /// coordinator runs source selection; to the worker it carries the
    /// chosen source.
    StartRecording {
        /// Source chosen by the picker.
        source_ref: SourceRef,
        /// Delay before capture begins.
        grace_ms: u64,
    },
    /// Stop the recording.
    StopRecording,
    /// Ask for the current recording status.
    StatusQuery,
    /// Unsolicited worker notification that capture ended.
    RecordingStopped,
    /// Human-readable status line for UI observers.
    StatusUpdate {
        /// Text shown to the user.
        message: String,
    },
}

impl Message {
    /// Wire name of the message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::StartRecording { .. } => "START_RECORDING",
            Message::StopRecording => "STOP_RECORDING",
            Message::StatusQuery => "STATUS_QUERY",
            Message::RecordingStopped => "RECORDING_STOPPED",
            Message::StatusUpdate { .. } => "STATUS_UPDATE",
        }
    }

    /// The worker command this message carries, if it is one.
    pub fn as_command(&self) -> Option<Command> {
        match self {
            Message::StartRecording {
                source_ref,
                grace_ms,
            } => Some(Command::Start {
                source_ref: source_ref.clone(),
                grace: Duration::from_millis(*grace_ms),
            }),
            Message::StopRecording => Some(Command::Stop),
            Message::StatusQuery => Some(Command::StatusQuery),
            Message::RecordingStopped | Message::StatusUpdate { .. } => None,
        }
    }

    /// Status line shortcut.
    pub fn status(message: impl Into<String>) -> Self {
        Message::StatusUpdate {
            message: message.into(),
        }
    }

    /// Encode as JSON.
    #[track_caller]
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    #[track_caller]
    pub fn from_json(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
