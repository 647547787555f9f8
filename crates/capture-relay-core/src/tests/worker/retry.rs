use crate::{RetryBudget, RetryPolicy};

use std::time::Duration;

/// WHAT: A budget of two retries allows exactly three attempts
/// WHY: The retry bound is an invariant that must hold without timers
#[test]
fn given_two_retries_when_consuming_budget_then_three_attempts_allowed() {
    // Given: A budget with two retries
    let mut budget = RetryBudget::new(2);

    // When: Attempting until the budget refuses
    let mut attempts = 0;
    loop {
        budget.record_attempt();
        attempts += 1;
        if !budget.try_retry() {
            break;
        }
    }

    // Then: Three attempts, nothing left
    assert_eq!(attempts, 3);
    assert_eq!(budget.attempts(), 3);
    assert_eq!(budget.remaining(), 0);
}

/// WHAT: A zero-retry budget allows a single attempt
/// WHY: Callers can opt out of retrying entirely
#[test]
fn given_zero_retries_when_retrying_then_refused() {
    // Given: No retries
    let mut budget = RetryPolicy {
        retries: 0,
        interval: Duration::ZERO,
    }
    .budget();

    // When: Recording one attempt and asking to retry
    budget.record_attempt();

    // Then: Refused
    assert!(!budget.try_retry());
    assert_eq!(budget.attempts(), 1);
}
