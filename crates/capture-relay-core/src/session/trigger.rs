use serde::{Deserialize, Serialize};

/// Where a start or stop request originated.
///
/// Carried for logging only; every origin converges on the same
/// coordinator operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    /// Global keyboard shortcut.
    Hotkey,
    /// Click on the action icon while the popup is disabled.
    ActionIcon,
    /// Button in the popup surface.
    Popup,
    /// Button in the in-page overlay.
    Overlay,
    /// The platform's own "stop sharing" control, reported by the worker.
    NativeStopSharing,
    /// Configured maximum duration elapsed.
    AutoStop,
}
