use crate::{CoreResult, session::SourceRef};

use async_trait::async_trait;

/// Suggested default target for the picker (e.g. the active tab or display).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHint(pub String);

/// The platform's modal capture-source picker.
#[async_trait]
pub trait SourcePicker: Send + Sync {
    /// Target the picker should pre-select, if the platform can tell.
    async fn default_target(&self) -> Option<TargetHint>;

    /// Show the picker. `Ok(None)` means the user dismissed it, which is
    /// normal control flow.
    async fn pick(&self, target: Option<TargetHint>) -> CoreResult<Option<SourceRef>>;
}
