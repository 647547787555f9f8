use capture_relay_core::Trigger;

/// Commands sent from trigger sources to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start if idle, otherwise stop.
    Toggle {
        /// Where the request came from.
        trigger: Trigger,
    },
    /// Start a new recording session.
    Start {
        /// Where the request came from.
        trigger: Trigger,
    },
    /// Stop whatever is running.
    Stop {
        /// Where the request came from.
        trigger: Trigger,
    },
    /// Request application shutdown.
    Shutdown,
}
