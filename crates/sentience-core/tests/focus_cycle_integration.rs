//! End-to-end focus cycles: context, recorder and on-disk store together.

use sentience_core::storage::{LocalStore, RemoteConfig, SessionLog};
use sentience_core::{
    run_recorder, FocusContext, HttpSessionService, NotificationBus, OfflineService, Phase,
    RecordOutcome, SessionKind, SessionRecorder, SilentTone,
};
use tempfile::TempDir;
use tokio::sync::mpsc;

fn db_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("sentience.db")
}

#[tokio::test]
async fn offline_cycle_is_recorded_and_resumable() {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::open_at(db_path(&dir)).unwrap();

    let recorder = SessionRecorder::new(
        OfflineService,
        LocalStore::open_at(db_path(&dir)).unwrap(),
        NotificationBus::new(),
    );
    let mut updates = recorder.bus().subscribe();
    let (tx, rx) = mpsc::unbounded_channel();
    let recorder_task = tokio::spawn(run_recorder(recorder, rx));

    let mut ctx = FocusContext::open(&store, SilentTone::new(), tx);
    ctx.set_work_duration(2).unwrap();
    ctx.set_break_duration(1).unwrap();
    ctx.start().unwrap();
    let done = ctx.advance(2 * 60 + 60 + 30).unwrap();
    assert_eq!(done.len(), 2);
    ctx.close().unwrap();

    let recorder = recorder_task.await.unwrap();
    let kinds: Vec<_> = recorder.log().list().iter().map(|r| (r.kind, r.duration)).collect();
    assert_eq!(kinds, vec![(SessionKind::Work, 2), (SessionKind::Break, 1)]);
    assert!(updates.try_recv().is_ok());
    assert!(updates.try_recv().is_ok());

    // Reopen from disk.
    let reopened = LocalStore::open_at(db_path(&dir)).unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();
    let ctx = FocusContext::open(&reopened, SilentTone::new(), tx);
    assert_eq!(ctx.timer().phase(), Phase::Working);
    assert_eq!(ctx.timer().seconds_remaining(), 90);
    assert_eq!(ctx.timer().sessions_completed(), 1);
    assert_eq!(ctx.timer().total_focus_seconds(), 210);
    assert!(ctx.timer().is_running());
}

#[tokio::test]
async fn failed_submission_is_queued_then_flushed() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", "/api/focus-sessions")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let remote = RemoteConfig {
        base_url: server.url(),
        token: "tok".into(),
        ..RemoteConfig::default()
    };
    let recorder = SessionRecorder::new(
        HttpSessionService::new(&remote).unwrap(),
        LocalStore::open_at(db_path(&dir)).unwrap(),
        NotificationBus::new(),
    );
    let mut updates = recorder.bus().subscribe();

    let outcome = recorder.record(SessionKind::Work, 25).await.unwrap();
    assert!(matches!(outcome, RecordOutcome::Queued { .. }));
    assert!(updates.try_recv().is_ok());
    assert!(updates.try_recv().is_err());
    failing.assert_async().await;
    failing.remove_async().await;

    let accepting = server
        .mock("POST", "/api/focus-sessions")
        .match_header("authorization", "Bearer tok")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "duration": 25,
            "type": "work"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"_id":"srv-9","date":"2026-05-04T10:00:00Z","duration":25,"type":"work"}"#)
        .create_async()
        .await;

    let report = recorder.flush_outbox().await.unwrap();
    assert_eq!(report.submitted, 1);
    assert_eq!(report.remaining, 0);
    accepting.assert_async().await;

    let log = SessionLog::new(LocalStore::open_at(db_path(&dir)).unwrap());
    assert!(log.outbox().is_empty());
    assert!(log.list().is_empty());
}
