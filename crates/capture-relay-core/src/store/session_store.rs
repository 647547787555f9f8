use crate::CoreResult;

use async_trait::async_trait;

/// Session-scoped key/value persistence holding the `isRecording` flag.
///
/// The flag is a projection of the coordinator's state, never a second
/// source of truth. A freshly started coordinator must treat what it reads
/// here as untrusted until corroborated by a live worker context.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted flag. A missing key reads as `false`.
    async fn is_recording(&self) -> CoreResult<bool>;

    /// Overwrite the persisted flag.
    async fn set_recording(&self, recording: bool) -> CoreResult<()>;
}
