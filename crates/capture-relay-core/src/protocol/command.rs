use crate::{protocol::Message, session::SourceRef};

use std::time::Duration;

/// Kind of a coordinator-to-worker command. Handling is idempotent per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Begin capturing.
    Start,
    /// Stop capturing.
    Stop,
    /// Report whether the worker is capturing.
    StatusQuery,
}

impl CommandKind {
    /// Wire name of the kind.
    pub fn wire_name(self) -> &'static str {
        match self {
            CommandKind::Start => "START_RECORDING",
            CommandKind::Stop => "STOP_RECORDING",
            CommandKind::StatusQuery => "STATUS_QUERY",
        }
    }
}

/// A command addressed to the worker context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start capturing `source_ref` after waiting `grace`.
    Start {
        /// Source to capture.
        source_ref: SourceRef,
        /// Settle delay before the first frame.
        grace: Duration,
    },
    /// Stop capturing.
    Stop,
    /// Ask whether the worker is capturing.
    StatusQuery,
}

impl Command {
    /// The kind of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Start { .. } => CommandKind::Start,
            Command::Stop => CommandKind::Stop,
            Command::StatusQuery => CommandKind::StatusQuery,
        }
    }

    /// Wire form of this command.
    pub fn to_message(&self) -> Message {
        match self {
            Command::Start { source_ref, grace } => Message::StartRecording {
                source_ref: source_ref.clone(),
                grace_ms: u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
            },
            Command::Stop => Message::StopRecording,
            Command::StatusQuery => Message::StatusQuery,
        }
    }
}
