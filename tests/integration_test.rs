use livecount::protocol::{ClientMessage, ServerMessage};
use livecount::recorder::{spawn_interval_recorder, DailyLog, Recorder};
use livecount::state::AppState;
use livecount::types::Counters;
use livecount::ws::handlers::handle_message;
use std::sync::Arc;
use std::time::Duration;

fn new_state(dir: &std::path::Path) -> Arc<AppState> {
    Arc::new(AppState::new(Recorder::new(DailyLog::new(dir))))
}

fn key(name: &str) -> String {
    name.to_string()
}

/// Counting, recording and reconnecting as one observer would
#[tokio::test]
async fn test_count_record_reconnect_flow() {
    let dir = tempfile::tempdir().unwrap();
    let state = new_state(dir.path());

    // 1. Observer joins and sees zeroed counters first
    let mut observer = state.register_session().await;
    assert_eq!(
        observer.initial[0],
        ServerMessage::CountersUpdated(Counters { first: 0, last: 0 })
    );

    // 2. Three at the front, five at the back
    for _ in 0..3 {
        handle_message(ClientMessage::Increment(key("first")), &state).await;
    }
    for _ in 0..5 {
        handle_message(ClientMessage::Increment(key("last")), &state).await;
    }

    let mut latest = None;
    while let Ok(msg) = observer.rx.try_recv() {
        latest = Some(msg);
    }
    let counters = match latest {
        Some(ServerMessage::CountersUpdated(counters)) => counters,
        other => panic!("Expected CountersUpdated, got {:?}", other),
    };
    assert_eq!(counters, Counters { first: 3, last: 5 });
    assert_eq!(counters.diff(), 2);

    // 3. Manual record
    let result = handle_message(ClientMessage::Record, &state).await;
    assert_eq!(result, Some(ServerMessage::RecordSaved { success: true }));

    let days = state.recorder.log().days().await.unwrap();
    assert_eq!(days.len(), 1);
    let content = state.recorder.log().read_day(days[0]).await.unwrap().unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" 3 5 2"), "unexpected line: {}", lines[0]);
    assert!(lines[0].starts_with(&days[0].format("%Y-%m-%d").to_string()));

    // 4. Disconnect, reconnect, get current counters immediately
    assert!(state.unregister_session(&observer.id).await);
    drop(observer);

    let returning = state.register_session().await;
    assert_eq!(
        returning.initial[0],
        ServerMessage::CountersUpdated(Counters { first: 3, last: 5 })
    );
    assert_eq!(
        returning.initial[2],
        ServerMessage::RecordingStatusUpdated { is_recording: true }
    );
}

/// Mixed traffic from many observers ends at the sum of their deltas
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_observers_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let state = new_state(dir.path());
    let mut watcher = state.register_session().await;

    let mut handles = Vec::new();
    for observer in 0..6 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..30 {
                let msg = if (observer + i) % 3 == 0 {
                    ClientMessage::Decrement(key("first"))
                } else {
                    ClientMessage::Increment(key("first"))
                };
                handle_message(msg, &state).await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // 180 ops, a third of them decrements
    let expected = 120 - 60;
    assert_eq!(state.snapshot().await.counters.first, expected);

    // Every broadcast moves by exactly one step from the previous one
    let mut previous = 0i64;
    let mut seen = 0;
    while let Ok(msg) = watcher.rx.try_recv() {
        if let ServerMessage::CountersUpdated(counters) = msg {
            assert_eq!((counters.first - previous).abs(), 1);
            previous = counters.first;
            seen += 1;
        }
    }
    assert_eq!(seen, 180);
    assert_eq!(previous, expected);
}

/// The scheduled recorder keeps going with nobody connected and recording off
#[tokio::test]
async fn test_auto_record_without_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let state = new_state(dir.path());

    handle_message(ClientMessage::Record, &state).await;
    handle_message(ClientMessage::RecordStop, &state).await;
    assert!(!state.snapshot().await.is_recording);
    assert_eq!(state.session_count().await, 0);

    let handle = spawn_interval_recorder(state.clone(), Duration::from_millis(40));
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.abort();

    let mut total = 0;
    for day in state.recorder.log().days().await.unwrap() {
        let content = state.recorder.log().read_day(day).await.unwrap().unwrap();
        total += content.lines().count();
    }
    // One manual record plus several scheduled ones
    assert!(total >= 3, "only {} records written", total);
}

/// A broken log directory reports failure to the requester and nothing else
#[tokio::test]
async fn test_unwritable_log_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let state = new_state(&blocker.join("records"));
    let mut observer = state.register_session().await;

    let result = handle_message(ClientMessage::Record, &state).await;
    assert_eq!(result, Some(ServerMessage::RecordSaved { success: false }));

    // Only the status flag went out to observers
    assert_eq!(
        observer.rx.recv().await.unwrap(),
        ServerMessage::RecordingStatusUpdated { is_recording: true }
    );
    assert!(observer.rx.try_recv().is_err());
}
