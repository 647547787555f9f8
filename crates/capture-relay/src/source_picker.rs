use capture_relay_core::{CoreResult, SourcePicker, SourceRef, TargetHint};

use async_trait::async_trait;
use tracing::{debug, info};

/// Picker for desktops without an interactive chooser: it accepts the
/// configured default source. With nothing configured, every selection
/// counts as dismissed.
pub struct ConfiguredSourcePicker {
    default_source: Option<String>,
}

impl ConfiguredSourcePicker {
    /// Picker answering with `default_source`.
    pub fn new(default_source: Option<String>) -> Self {
        Self {
            default_source: default_source.filter(|s| !s.trim().is_empty()),
        }
    }
}

#[async_trait]
impl SourcePicker for ConfiguredSourcePicker {
    async fn default_target(&self) -> Option<TargetHint> {
        self.default_source.clone().map(TargetHint)
    }

    async fn pick(&self, target: Option<TargetHint>) -> CoreResult<Option<SourceRef>> {
        match target {
            Some(TargetHint(source)) => {
                debug!(source = %source, "Source selected");
                Ok(Some(SourceRef::new(source)))
            }
            None => {
                info!("No capture source configured, selection dismissed");
                Ok(None)
            }
        }
    }
}
