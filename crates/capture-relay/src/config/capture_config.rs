use crate::config::{default_mime_type, default_start_grace_ms};

use serde::{Deserialize, Serialize};

/// Capture process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Delay between the worker accepting a start and the first frame.
    #[serde(default = "default_start_grace_ms")]
    pub start_grace_ms: u64,

    /// Source offered to the picker (display, window or device token).
    /// None means every start is cancelled at selection.
    #[serde(default)]
    pub default_source: Option<String>,

    /// External recorder executable.
    #[serde(default)]
    pub program: String,

    /// Recorder arguments. `{source}` and `{output}` are substituted.
    #[serde(default)]
    pub args: Vec<String>,

    /// Container MIME type the recorder produces.
    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// Stop a session automatically after this many seconds.
    #[serde(default)]
    pub max_duration_secs: Option<u64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            start_grace_ms: default_start_grace_ms(),
            default_source: None,
            program: String::new(),
            args: Vec::new(),
            mime_type: default_mime_type(),
            max_duration_secs: None,
        }
    }
}
