use capture_relay_core::IndicatorState;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations and process lifecycle events flow through this enum.
#[derive(Debug, Clone)]
pub enum TrayCommand {
    /// Redraw the tray from a status event.
    Refresh {
        /// Icon, badge and popup availability.
        indicator: IndicatorState,
        /// Latest status line, shown as the tooltip.
        message: String,
    },
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
