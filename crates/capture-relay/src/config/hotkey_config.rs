use crate::config::default_accelerator;

use serde::{Deserialize, Serialize};

/// Global hotkey configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Toggle accelerator, e.g. `ctrl+shift+KeyR`.
    #[serde(default = "default_accelerator")]
    pub accelerator: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            accelerator: default_accelerator(),
        }
    }
}
