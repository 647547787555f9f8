mod broadcaster;
mod indicator;
mod status_event;

pub use {
    broadcaster::StatusBroadcaster,
    indicator::{IconVariant, IndicatorState},
    status_event::{EventOrigin, StatusEvent},
};

/// Canonical status lines, one per transition.
pub mod messages {
    /// Idle -> Preparing.
    pub const SELECTING_SOURCE: &str = "Select a source to record";
    /// Preparing -> Recording.
    pub const RECORDING_STARTED: &str = "Recording started";
    /// Idle -> Recording when a live worker is adopted.
    pub const RECORDING_IN_PROGRESS: &str = "Recording in progress";
    /// Recording/Preparing -> Stopping.
    pub const STOPPING: &str = "Stopping";
    /// Any -> Idle after a stop.
    pub const IDLE: &str = "Idle";
    /// Preparing -> Idle after the picker was dismissed.
    pub const CANCELLED: &str = "Recording cancelled";
    /// Prefix for Preparing -> Idle after a failed start.
    pub const START_FAILED: &str = "Start failed";
}
