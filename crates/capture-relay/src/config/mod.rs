mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod hotkey_config;
mod output_config;
mod worker_config;

pub(crate) use {
    capture_config::CaptureConfig, config::Config, hotkey_config::HotkeyConfig,
    output_config::OutputConfig, worker_config::WorkerConfig,
};

pub(crate) const DEFAULT_START_GRACE_MS: u64 = 3000;
pub(crate) const DEFAULT_MIME_TYPE: &str = "video/mp4";
pub(crate) const DEFAULT_SETTLE_MS: u64 = 500;
pub(crate) const DEFAULT_DISPATCH_RETRIES: u32 = 3;
pub(crate) const DEFAULT_RETRY_INTERVAL_MS: u64 = 200;
pub(crate) const DEFAULT_LISTENER_DELAY_MS: u64 = 100;
pub(crate) const DEFAULT_FILE_PREFIX: &str = "capture-relay";
pub(crate) const DEFAULT_ACCELERATOR: &str = "ctrl+shift+KeyR";

pub(crate) fn default_start_grace_ms() -> u64 {
    DEFAULT_START_GRACE_MS
}

pub(crate) fn default_mime_type() -> String {
    DEFAULT_MIME_TYPE.to_string()
}

pub(crate) fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

pub(crate) fn default_dispatch_retries() -> u32 {
    DEFAULT_DISPATCH_RETRIES
}

pub(crate) fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

pub(crate) fn default_listener_delay_ms() -> u64 {
    DEFAULT_LISTENER_DELAY_MS
}

pub(crate) fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

pub(crate) fn default_accelerator() -> String {
    DEFAULT_ACCELERATOR.to_string()
}
