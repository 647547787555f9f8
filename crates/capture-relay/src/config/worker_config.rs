use crate::config::{
    default_dispatch_retries, default_listener_delay_ms, default_retry_interval_ms,
    default_settle_ms,
};

use serde::{Deserialize, Serialize};

/// Worker context timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Wait after creating the worker context before the first send.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Extra send attempts when the worker has no listener yet.
    #[serde(default = "default_dispatch_retries")]
    pub dispatch_retries: u32,

    /// Pause between send attempts.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// How long a new worker takes to attach its listener.
    #[serde(default = "default_listener_delay_ms")]
    pub listener_delay_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            dispatch_retries: default_dispatch_retries(),
            retry_interval_ms: default_retry_interval_ms(),
            listener_delay_ms: default_listener_delay_ms(),
        }
    }
}
