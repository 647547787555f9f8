use crate::{
    CoreResult, RelayError,
    protocol::{Command, WorkerReply},
    worker::{EnsureOutcome, RetryPolicy, SendFailure, WorkerContextManager},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, instrument, warn};

/// Delivers commands to the worker context, at least once, with bounded retries.
///
/// There are no sequence numbers: two dispatch calls may arrive in either
/// order, so the receiving side must handle each kind idempotently.
pub struct MessageDispatcher {
    workers: Arc<WorkerContextManager>,
    policy: RetryPolicy,
}

impl MessageDispatcher {
    /// Create a dispatcher using `policy` for every call.
    pub fn new(workers: Arc<WorkerContextManager>, policy: RetryPolicy) -> Self {
        Self { workers, policy }
    }

    /// Deliver `command` with the configured retry policy.
    pub async fn dispatch(&self, command: &Command) -> CoreResult<WorkerReply> {
        self.dispatch_with(command, self.policy).await
    }

    /// Deliver `command`, retrying only while no receiver is listening.
    ///
    /// Each attempt re-runs `ensure` first, so a context torn down between
    /// attempts is recreated.
    #[instrument(skip(self, command), fields(kind = command.kind().wire_name()))]
    pub async fn dispatch_with(
        &self,
        command: &Command,
        policy: RetryPolicy,
    ) -> CoreResult<WorkerReply> {
        let location = ErrorLocation::from(Location::caller());
        let message = command.to_message();
        let kind = command.kind().wire_name();
        let mut budget = policy.budget();

        loop {
            if let EnsureOutcome::Failed { reason } = self.workers.ensure().await {
                return Err(RelayError::WorkerCreationFailed { reason, location });
            }

            budget.record_attempt();
            match self.workers.platform().send(&message).await {
                Ok(reply) => {
                    debug!(attempts = budget.attempts(), reply = ?reply, "Command delivered");
                    return Ok(reply);
                }
                Err(SendFailure::NoReceiver) if budget.try_retry() => {
                    debug!(
                        attempt = budget.attempts(),
                        remaining = budget.remaining(),
                        "No receiver yet, retrying"
                    );
                    tokio::time::sleep(policy.interval).await;
                }
                Err(SendFailure::NoReceiver) => {
                    warn!(attempts = budget.attempts(), "Dispatch retries exhausted");
                    return Err(RelayError::DispatchExhausted {
                        kind,
                        attempts: budget.attempts(),
                        location,
                    });
                }
                Err(SendFailure::Other(reason)) => {
                    warn!(reason = %reason, "Dispatch failed");
                    return Err(RelayError::SendFailed { reason, location });
                }
            }
        }
    }
}
