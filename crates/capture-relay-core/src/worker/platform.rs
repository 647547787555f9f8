use crate::{
    CoreResult,
    protocol::{Message, WorkerReply},
};

use async_trait::async_trait;

/// Error text the platform uses when a second worker context is requested
/// while one exists or is being created.
pub const SINGLE_CONTEXT_ERROR: &str = "Only a single offscreen document may be created";

/// Error text the platform uses when a message finds no listener.
pub const NO_RECEIVER_ERROR: &str = "Could not establish connection. Receiving end does not exist";

/// Why a send to the worker context failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// Nobody is listening yet. Transient; worth retrying.
    NoReceiver,
    /// Any other failure. Not retried.
    Other(String),
}

impl SendFailure {
    /// Classify a raw platform error string.
    pub fn from_platform_message(message: &str) -> Self {
        if message.contains("Receiving end does not exist") {
            SendFailure::NoReceiver
        } else {
            SendFailure::Other(message.to_string())
        }
    }
}

impl std::fmt::Display for SendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendFailure::NoReceiver => f.write_str(NO_RECEIVER_ERROR),
            SendFailure::Other(reason) => f.write_str(reason),
        }
    }
}

/// Host platform that owns the hidden capture-capable context.
///
/// Implementations report a creation race by failing `create_context` with
/// a `WorkerCreationFailed` whose reason contains [`SINGLE_CONTEXT_ERROR`].
#[async_trait]
pub trait WorkerPlatform: Send + Sync {
    /// Whether a worker context currently exists (it may not be listening yet).
    async fn has_context(&self) -> bool;

    /// Ask the platform to create the worker context.
    async fn create_context(&self) -> CoreResult<()>;

    /// Deliver one message to the worker's listener and wait for its reply.
    async fn send(&self, message: &Message) -> Result<WorkerReply, SendFailure>;
}
