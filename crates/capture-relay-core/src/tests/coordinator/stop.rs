use crate::{
    EventOrigin, Message, MemorySessionStore, SendFailure, SessionState, StartOutcome, Trigger,
    messages,
    tests::support::{FakePlatform, Harness, Pick, ScriptedPicker},
};

use std::{sync::Arc, time::Duration};

use tokio::sync::Notify;

async fn recording_harness() -> Harness {
    let mut h = Harness::new(
        FakePlatform::new(),
        ScriptedPicker::new([Pick::Select("tab:7"), Pick::Select("tab:8")]),
        MemorySessionStore::new(),
    );
    h.coordinator.handle_start(Trigger::Hotkey).await;
    h.drain_events();
    h
}

/// WHAT: Stop while recording dispatches Stop and returns to Idle
/// WHY: The normal stop path must clear the flag and notify the worker once
#[tokio::test(start_paused = true)]
async fn given_recording_when_stopped_then_idle_and_stop_dispatched() {
    // Given: A recording session
    let mut h = recording_harness().await;

    // When: Stopping from the action icon
    h.coordinator.handle_stop(Trigger::ActionIcon).await;

    // Then: Idle, flag false, one Stop sent, Stopping then Idle broadcast
    assert_eq!(h.coordinator.state().await, SessionState::Idle);
    assert!(!h.flag().await);
    assert_eq!(
        h.platform.sent_kinds(),
        vec!["START_RECORDING", "STOP_RECORDING"]
    );
    let events = h.drain_events();
    let states: Vec<_> = events.iter().map(|e| e.state).collect();
    assert_eq!(states, vec![SessionState::Stopping, SessionState::Idle]);
    assert_eq!(events.last().map(|e| e.message.as_str()), Some(messages::IDLE));
}

/// WHAT: A second stop produces the same end state and no extra transition
/// WHY: Stop is idempotent across every trigger source
#[tokio::test(start_paused = true)]
async fn given_stopped_session_when_stopped_again_then_same_end_state() {
    // Given: A session that was just stopped
    let mut h = recording_harness().await;
    h.coordinator.handle_stop(Trigger::Hotkey).await;
    let first = h.coordinator.snapshot().await;
    h.drain_events();

    // When: Stopping again
    h.coordinator.handle_stop(Trigger::Overlay).await;

    // Then: Identical observable state and no new transition event
    let second = h.coordinator.snapshot().await;
    assert_eq!(first, second);
    assert_eq!(second.state, SessionState::Idle);
    assert!(!second.is_recording);
    assert!(h.drain_events().is_empty());
}

/// WHAT: Stop succeeds locally when the worker context has vanished
/// WHY: The UI must never be stuck in "recording" because the worker is gone
#[tokio::test(start_paused = true)]
async fn given_worker_gone_when_stopped_then_idle_without_recreating_worker() {
    // Given: A recording whose worker context crashed silently
    let h = recording_harness().await;
    h.platform.remove_context();

    // When: Stopping
    h.coordinator.handle_stop(Trigger::Hotkey).await;

    // Then: Idle and flag clear, no Stop sent, no new context created
    assert_eq!(h.coordinator.state().await, SessionState::Idle);
    assert!(!h.flag().await);
    assert_eq!(h.platform.sent_kinds(), vec!["START_RECORDING"]);
    assert_eq!(h.platform.create_calls(), 1);
}

/// WHAT: Stop succeeds locally when delivery to the worker fails
/// WHY: Local state reset is never conditioned on dispatch success
#[tokio::test(start_paused = true)]
async fn given_unreachable_worker_when_stopped_then_idle_anyway() {
    // Given: A recording whose listener stopped answering
    let h = recording_harness().await;
    h.platform.fail_sends(3, SendFailure::NoReceiver);

    // When: Stopping
    h.coordinator.handle_stop(Trigger::Popup).await;

    // Then: Idle after the bounded attempts
    assert_eq!(h.coordinator.state().await, SessionState::Idle);
    assert!(!h.flag().await);
    assert_eq!(h.platform.sent_kinds().len(), 4);
}

/// WHAT: RECORDING_STOPPED from the worker ends the session without sending Stop
/// WHY: The worker already stopped; echoing Stop back is pointless
#[tokio::test(start_paused = true)]
async fn given_recording_when_worker_reports_stop_then_idle_and_no_stop_sent() {
    // Given: A recording session
    let mut h = recording_harness().await;

    // When: The worker reports the user hit the native "stop sharing" control
    h.coordinator
        .handle_message(Message::RecordingStopped, Trigger::NativeStopSharing)
        .await;

    // Then: Idle, flag false, no outbound Stop
    assert_eq!(h.coordinator.state().await, SessionState::Idle);
    assert!(!h.flag().await);
    assert_eq!(h.platform.sent_kinds(), vec!["START_RECORDING"]);
    assert_eq!(
        h.drain_events().last().map(|e| e.state),
        Some(SessionState::Idle)
    );
}

/// WHAT: Auto-stop only applies to the session that scheduled it
/// WHY: A timer from an old session must not end a newer one
#[tokio::test(start_paused = true)]
async fn given_newer_session_when_stale_auto_stop_fires_then_ignored() {
    // Given: Session A stopped, session B recording
    let h = recording_harness().await;
    let old_id = h.coordinator.snapshot().await.session_id;
    h.coordinator.handle_stop(Trigger::Hotkey).await;
    h.coordinator.handle_start(Trigger::Hotkey).await;

    // When: Session A's auto-stop fires
    if let Some(id) = old_id {
        h.coordinator.stop_if_current(id, Trigger::AutoStop).await;
    }

    // Then: Session B keeps recording
    assert!(old_id.is_some());
    assert_eq!(h.coordinator.state().await, SessionState::Recording);
    assert!(h.flag().await);
}

/// WHAT: Worker status lines are relayed to observers as notices
/// WHY: Observers learn "Video saved" without polling
#[tokio::test(start_paused = true)]
async fn given_worker_status_update_when_handled_then_notice_broadcast() {
    // Given: An idle coordinator
    let mut h = Harness::new(
        FakePlatform::new(),
        ScriptedPicker::new([]),
        MemorySessionStore::new(),
    );

    // When: The worker posts a status line
    h.coordinator
        .handle_message(Message::status("Video saved"), Trigger::NativeStopSharing)
        .await;

    // Then: One worker-origin event with the current state
    let events = h.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].origin, EventOrigin::Worker);
    assert_eq!(events[0].state, SessionState::Idle);
    assert_eq!(events[0].message, "Video saved");
}

/// WHAT: A stop still retrying delivery leaves a session started after it alone
/// WHY: The worker-reported stop already ended the old session; the slow stop
/// must not wipe the next one or announce Idle twice
#[tokio::test(start_paused = true)]
async fn given_stop_retrying_when_new_session_starts_then_new_session_survives() {
    // Given: A recording whose worker is slow to take the Stop
    let gate = Arc::new(Notify::new());
    let mut h = Harness::new(
        FakePlatform::new(),
        ScriptedPicker::gated(
            [Pick::Select("tab:7"), Pick::Select("tab:8")],
            Arc::clone(&gate),
        ),
        MemorySessionStore::new(),
    );
    gate.notify_one();
    assert_eq!(
        h.coordinator.handle_start(Trigger::Hotkey).await,
        StartOutcome::Started
    );
    h.drain_events();
    h.platform.fail_sends(2, SendFailure::NoReceiver);

    let coordinator = Arc::clone(&h.coordinator);
    let slow_stop = tokio::spawn(async move { coordinator.handle_stop(Trigger::ActionIcon).await });
    while h.coordinator.state().await != SessionState::Stopping {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    // When: The worker reports the stop, a new session opens its picker,
    // and then the slow stop finishes
    h.coordinator.on_worker_reported_stop().await;
    let coordinator = Arc::clone(&h.coordinator);
    let next_start = tokio::spawn(async move { coordinator.handle_start(Trigger::Popup).await });
    while h.coordinator.state().await != SessionState::Preparing {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    #[allow(clippy::unwrap_used)]
    slow_stop.await.unwrap();

    // Then: The new session is still preparing and Idle was announced once
    let snapshot = h.coordinator.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Preparing);
    assert!(snapshot.session_id.is_some());
    let states: Vec<_> = h.drain_events().iter().map(|e| e.state).collect();
    assert_eq!(
        states,
        vec![
            SessionState::Stopping,
            SessionState::Idle,
            SessionState::Preparing
        ]
    );

    // And: Once the picker resolves the new session records normally
    gate.notify_one();
    #[allow(clippy::unwrap_used)]
    let outcome = next_start.await.unwrap();
    assert_eq!(outcome, StartOutcome::Started);
    assert_eq!(h.coordinator.state().await, SessionState::Recording);
    assert!(h.flag().await);
}

/// WHAT: STATUS_QUERY is answered with the session snapshot
/// WHY: UI surfaces read the current state through the message router
#[tokio::test(start_paused = true)]
async fn given_recording_when_status_queried_then_snapshot_returned() {
    // Given: A recording session
    let h = recording_harness().await;

    // When: A surface queries status, and separately sends a stop
    let answer = h
        .coordinator
        .handle_message(Message::StatusQuery, Trigger::Popup)
        .await;
    let stop_answer = h
        .coordinator
        .handle_message(Message::StopRecording, Trigger::Popup)
        .await;

    // Then: The query carries the recording snapshot, the stop carries nothing
    #[allow(clippy::unwrap_used)]
    let snapshot = answer.unwrap();
    assert_eq!(snapshot.state, SessionState::Recording);
    assert!(snapshot.is_recording);
    assert_eq!(snapshot.source_ref.map(|s| s.to_string()), Some("tab:7".to_string()));
    assert!(stop_answer.is_none());
    assert_eq!(h.coordinator.state().await, SessionState::Idle);
}
