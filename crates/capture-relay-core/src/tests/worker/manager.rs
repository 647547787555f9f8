use crate::{
    EnsureOutcome, SINGLE_CONTEXT_ERROR, WorkerContextManager, tests::support::FakePlatform,
};

use std::{sync::Arc, time::Duration};

fn manager(platform: &Arc<FakePlatform>) -> WorkerContextManager {
    WorkerContextManager::new(platform.clone(), Duration::from_millis(20))
}

/// WHAT: An absent context is created and reported as Created
/// WHY: Capture commands need a context before they are sent
#[tokio::test(start_paused = true)]
async fn given_no_context_when_ensuring_then_created() {
    // Given: No worker context
    let platform = Arc::new(FakePlatform::new());

    // When: Ensuring readiness
    let outcome = manager(&platform).ensure().await;

    // Then: One creation request
    assert_eq!(outcome, EnsureOutcome::Created);
    assert_eq!(platform.create_calls(), 1);
}

/// WHAT: An existing context is reused
/// WHY: Only one worker context may exist
#[tokio::test(start_paused = true)]
async fn given_existing_context_when_ensuring_then_no_creation() {
    // Given: A live context
    let platform = Arc::new(FakePlatform::with_context());

    // When: Ensuring readiness
    let outcome = manager(&platform).ensure().await;

    // Then: Nothing is created
    assert_eq!(outcome, EnsureOutcome::AlreadyExists);
    assert_eq!(platform.create_calls(), 0);
}

/// WHAT: The single-context error from a racing creation counts as success
/// WHY: A hotkey pressed twice quickly must not fail spuriously
#[tokio::test(start_paused = true)]
async fn given_racing_creation_when_ensuring_then_already_exists() {
    // Given: The platform reports another creation in flight
    let platform = Arc::new(FakePlatform::new());
    platform.fail_creation(&format!("{}.", SINGLE_CONTEXT_ERROR));

    // When: Ensuring readiness
    let outcome = manager(&platform).ensure().await;

    // Then: Treated as ready
    assert_eq!(outcome, EnsureOutcome::AlreadyExists);
    assert!(outcome.is_ready());
}

/// WHAT: Any other creation error is a failure
/// WHY: Callers must not dispatch into a context that will never exist
#[tokio::test(start_paused = true)]
async fn given_creation_error_when_ensuring_then_failed() {
    // Given: The platform refuses creation outright
    let platform = Arc::new(FakePlatform::new());
    platform.fail_creation("USER_MEDIA reason not permitted");

    // When: Ensuring readiness
    let manager = manager(&platform);
    let ready = manager.ensure_ready().await;

    // Then: Not ready and no context
    assert!(!ready);
    assert!(!manager.exists().await);
}

/// WHAT: Creation waits out the settle interval before reporting readiness
/// WHY: The new context has no ready signal, only a timed assumption
#[tokio::test(start_paused = true)]
async fn given_no_context_when_ensuring_then_settle_interval_elapses() {
    // Given: No worker context
    let platform = Arc::new(FakePlatform::new());
    let started = tokio::time::Instant::now();

    // When: Ensuring readiness
    manager(&platform).ensure().await;

    // Then: At least the settle interval passed
    assert!(started.elapsed() >= Duration::from_millis(20));
}
