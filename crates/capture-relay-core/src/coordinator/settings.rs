use crate::worker::RetryPolicy;

use std::time::Duration;

/// Timing knobs for [`SessionCoordinator`](crate::SessionCoordinator).
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorSettings {
    /// Delay between start acceptance and the first captured frame.
    pub start_grace: Duration,
    /// Time a new worker context is given to attach its listener.
    pub settle: Duration,
    /// Delivery policy for every worker command.
    pub retry: RetryPolicy,
    /// Buffered status events per lagging observer.
    pub status_capacity: usize,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            start_grace: Duration::from_secs(3),
            settle: Duration::from_millis(500),
            retry: RetryPolicy::default(),
            status_capacity: 64,
        }
    }
}
