use crate::{
    Command, MessageDispatcher, RelayError, RetryPolicy, SendFailure, WorkerContextManager,
    WorkerReply, tests::support::FakePlatform,
};

use std::{sync::Arc, time::Duration};

fn dispatcher(platform: &Arc<FakePlatform>, retries: u32) -> MessageDispatcher {
    let workers = Arc::new(WorkerContextManager::new(
        platform.clone(),
        Duration::from_millis(5),
    ));
    MessageDispatcher::new(
        workers,
        RetryPolicy {
            retries,
            interval: Duration::from_millis(10),
        },
    )
}

/// WHAT: With retries=2 and no listener, dispatch makes 3 attempts then fails
/// WHY: The retry bound must be deterministic
#[tokio::test(start_paused = true)]
async fn given_no_listener_when_dispatching_with_two_retries_then_three_attempts_and_failure() {
    // Given: A context that never attaches a listener
    let platform = Arc::new(FakePlatform::with_context());
    platform.fail_sends(10, SendFailure::NoReceiver);

    // When: Dispatching Stop
    let result = dispatcher(&platform, 2).dispatch(&Command::Stop).await;

    // Then: Exactly 3 attempts and an exhaustion error
    assert!(matches!(
        result,
        Err(RelayError::DispatchExhausted { attempts: 3, .. })
    ));
    assert_eq!(platform.sent_kinds().len(), 3);
}

/// WHAT: A listener that attaches during the retries receives the command
/// WHY: The worker may still be initializing on the first attempt
#[tokio::test(start_paused = true)]
async fn given_late_listener_when_dispatching_then_delivered_on_retry() {
    // Given: Two misses before the listener attaches
    let platform = Arc::new(FakePlatform::with_context());
    platform.fail_sends(2, SendFailure::NoReceiver);

    // When: Dispatching a status query
    let result = dispatcher(&platform, 2)
        .dispatch(&Command::StatusQuery)
        .await;

    // Then: Delivered on the third attempt
    assert!(matches!(result, Ok(WorkerReply::Idle)));
    assert_eq!(platform.sent_kinds().len(), 3);
}

/// WHAT: Failures other than "no receiver" are not retried
/// WHY: Only the transient listener race is worth waiting out
#[tokio::test(start_paused = true)]
async fn given_hard_send_failure_when_dispatching_then_single_attempt() {
    // Given: A send that fails for a non-transient reason
    let platform = Arc::new(FakePlatform::with_context());
    platform.fail_sends(1, SendFailure::Other("message too large".to_string()));

    // When: Dispatching
    let result = dispatcher(&platform, 5).dispatch(&Command::Stop).await;

    // Then: One attempt, SendFailed
    assert!(matches!(result, Err(RelayError::SendFailed { .. })));
    assert_eq!(platform.sent_kinds().len(), 1);
}

/// WHAT: No send is attempted when the context cannot be created
/// WHY: Dispatching into a context that does not exist is pointless
#[tokio::test(start_paused = true)]
async fn given_creation_failure_when_dispatching_then_nothing_sent() {
    // Given: Creation is refused
    let platform = Arc::new(FakePlatform::new());
    platform.fail_creation("blocked by policy");

    // When: Dispatching
    let result = dispatcher(&platform, 2).dispatch(&Command::Stop).await;

    // Then: Creation error, no attempts
    assert!(matches!(
        result,
        Err(RelayError::WorkerCreationFailed { .. })
    ));
    assert!(platform.sent_kinds().is_empty());
}
