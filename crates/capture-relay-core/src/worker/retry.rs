use std::time::Duration;

/// Bounded retry policy for command delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts are `retries + 1`.
    pub retries: u32,
    /// Fixed wait between attempts.
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            interval: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Fresh budget for one dispatch call.
    pub fn budget(&self) -> RetryBudget {
        RetryBudget::new(self.retries)
    }
}

/// Attempt bookkeeping for a single dispatch, independent of any timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
    attempts: u32,
}

impl RetryBudget {
    /// Budget allowing `retries` retries.
    pub fn new(retries: u32) -> Self {
        Self {
            remaining: retries,
            attempts: 0,
        }
    }

    /// Count one send attempt.
    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Consume one retry. Returns `false` once the budget is spent.
    pub fn try_retry(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    /// Attempts recorded so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Retries still available.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}
