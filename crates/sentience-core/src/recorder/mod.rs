//! Session recorder.
//!
//! Persists one record per completed phase, remotely when signed in and
//! locally otherwise, then raises a single `DataUpdated` notification.
//!
//! A failed remote submission is not dropped: the record goes to the local
//! outbox and is retried by `flush_outbox`.

mod bus;
mod record;
mod service;

pub use bus::NotificationBus;
pub use record::{FocusSessionRecord, SessionDraft};
pub use service::{HttpSessionService, OfflineService, SessionService};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::StoreError;
use crate::storage::{KeyValueStore, SessionExport, SessionLog};
use crate::timer::{PhaseCompletion, SessionKind};

/// Where a recorded session ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stored", rename_all = "lowercase")]
pub enum RecordOutcome {
    /// Accepted by the session service; the server id is canonical.
    Remote { record: FocusSessionRecord },
    /// Kept in the local session list (not signed in).
    Local { record: FocusSessionRecord },
    /// Submission failed; waiting in the outbox.
    Queued {
        record: FocusSessionRecord,
        error: String,
    },
}

impl RecordOutcome {
    pub fn record(&self) -> &FocusSessionRecord {
        match self {
            RecordOutcome::Remote { record }
            | RecordOutcome::Local { record }
            | RecordOutcome::Queued { record, .. } => record,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub submitted: usize,
    pub remaining: usize,
    pub error: Option<String>,
}

pub struct SessionRecorder<R, S> {
    service: R,
    log: SessionLog<S>,
    bus: NotificationBus,
}

impl<R: SessionService, S: KeyValueStore> SessionRecorder<R, S> {
    pub fn new(service: R, store: S, bus: NotificationBus) -> Self {
        Self {
            service,
            log: SessionLog::new(store),
            bus,
        }
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn log(&self) -> &SessionLog<S> {
        &self.log
    }

    pub async fn record(
        &self,
        kind: SessionKind,
        duration_minutes: u32,
    ) -> Result<RecordOutcome, StoreError> {
        self.record_at(kind, duration_minutes, Utc::now()).await
    }

    pub async fn record_at(
        &self,
        kind: SessionKind,
        duration_minutes: u32,
        date: DateTime<Utc>,
    ) -> Result<RecordOutcome, StoreError> {
        let draft = SessionDraft::new(kind, duration_minutes, date);

        let outcome = if self.service.is_authenticated() {
            match self.service.submit(&draft).await {
                Ok(record) => RecordOutcome::Remote { record },
                Err(e) => {
                    warn!(
                        kind = kind.as_str(),
                        error = %e,
                        "session submission failed, queued locally"
                    );
                    let record = self.log.enqueue(&draft)?;
                    RecordOutcome::Queued {
                        record,
                        error: e.to_string(),
                    }
                }
            }
        } else {
            RecordOutcome::Local {
                record: self.log.append(&draft)?,
            }
        };

        self.bus.notify();
        Ok(outcome)
    }

    /// Retry queued records in order, stopping at the first failure.
    pub async fn flush_outbox(&self) -> Result<FlushReport, StoreError> {
        let pending = self.log.outbox();
        if pending.is_empty() || !self.service.is_authenticated() {
            return Ok(FlushReport {
                submitted: 0,
                remaining: pending.len(),
                error: None,
            });
        }

        let mut submitted = 0;
        let mut error = None;
        for record in &pending {
            match self.service.submit(&SessionDraft::from(record)).await {
                Ok(stored) => {
                    info!(
                        local_id = %record.id,
                        remote_id = %stored.id,
                        "queued session submitted"
                    );
                    submitted += 1;
                }
                Err(e) => {
                    warn!(local_id = %record.id, error = %e, "queued session still failing");
                    error = Some(e.to_string());
                    break;
                }
            }
        }

        let remaining = &pending[submitted..];
        self.log.replace_outbox(remaining)?;
        if submitted > 0 {
            self.bus.notify();
        }
        Ok(FlushReport {
            submitted,
            remaining: remaining.len(),
            error,
        })
    }

    /// Every record visible to the profile, oldest first.
    ///
    /// Signed in: the service's records plus the outbox. Otherwise, or when
    /// the service is unreachable: the local list plus the outbox.
    pub async fn history(&self) -> Vec<FocusSessionRecord> {
        let mut records = if self.service.is_authenticated() {
            match self.service.fetch_all().await {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "session retrieval failed, using local records");
                    self.log.list()
                }
            }
        } else {
            self.log.list()
        };
        records.extend(self.log.outbox());
        records.sort_by_key(|r| r.date);
        records
    }

    pub fn export(&self) -> SessionExport {
        self.log.export()
    }

    /// Delete local records and notify views.
    pub fn clear_local(&self) -> Result<usize, StoreError> {
        let removed = self.log.clear()?;
        self.bus.notify();
        Ok(removed)
    }
}

/// Record every completion arriving on `rx` until the sending side closes.
///
/// Queued records are retried once at startup and after every successful
/// remote submission. Returns the recorder for reuse or inspection.
pub async fn run_recorder<R, S>(
    recorder: SessionRecorder<R, S>,
    mut rx: mpsc::UnboundedReceiver<PhaseCompletion>,
) -> SessionRecorder<R, S>
where
    R: SessionService,
    S: KeyValueStore,
{
    flush_quietly(&recorder).await;

    while let Some(done) = rx.recv().await {
        match recorder
            .record_at(done.kind, done.duration_minutes, done.completed_at)
            .await
        {
            Ok(outcome) => {
                info!(
                    kind = done.kind.as_str(),
                    minutes = done.duration_minutes,
                    id = %outcome.record().id,
                    "session recorded"
                );
                if matches!(outcome, RecordOutcome::Remote { .. }) {
                    flush_quietly(&recorder).await;
                }
            }
            Err(e) => error!(kind = done.kind.as_str(), error = %e, "failed to store session"),
        }
    }
    recorder
}

async fn flush_quietly<R: SessionService, S: KeyValueStore>(recorder: &SessionRecorder<R, S>) {
    if let Err(e) = recorder.flush_outbox().await {
        error!(error = %e, "failed to update session outbox");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-process stand-in for the session service.
    #[derive(Clone, Default)]
    struct FakeService {
        signed_in: bool,
        failing: Arc<AtomicBool>,
        next_id: Arc<AtomicUsize>,
        stored: Arc<Mutex<Vec<FocusSessionRecord>>>,
    }

    impl FakeService {
        fn signed_in() -> Self {
            Self {
                signed_in: true,
                ..Self::default()
            }
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn stored(&self) -> Vec<FocusSessionRecord> {
            self.stored.lock().unwrap().clone()
        }
    }

    impl SessionService for FakeService {
        fn is_authenticated(&self) -> bool {
            self.signed_in
        }

        async fn submit(&self, draft: &SessionDraft) -> Result<FocusSessionRecord, RemoteError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(RemoteError::Transport("connection refused".into()));
            }
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            let record = draft.with_id(format!("srv-{n}"));
            self.stored.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn fetch_all(&self) -> Result<Vec<FocusSessionRecord>, RemoteError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(RemoteError::Status { status: 503 });
            }
            Ok(self.stored())
        }
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<crate::events::DataUpdated>) -> usize {
        let mut n = 0;
        while rx.try_recv().is_ok() {
            n += 1;
        }
        n
    }

    #[tokio::test]
    async fn offline_records_go_to_local_list() {
        let store = MemoryStore::new();
        let recorder = SessionRecorder::new(OfflineService, store.clone(), NotificationBus::new());
        let mut rx = recorder.bus().subscribe();

        let outcome = recorder.record(SessionKind::Work, 25).await.unwrap();
        assert!(matches!(outcome, RecordOutcome::Local { .. }));
        assert!(outcome.record().id.starts_with("local-"));
        assert_eq!(recorder.log().list().len(), 1);
        assert_eq!(drain(&mut rx), 1);
    }

    #[tokio::test]
    async fn signed_in_records_use_server_id() {
        let service = FakeService::signed_in();
        let recorder = SessionRecorder::new(
            service.clone(),
            MemoryStore::new(),
            NotificationBus::new(),
        );
        let mut rx = recorder.bus().subscribe();

        let outcome = recorder.record(SessionKind::Break, 5).await.unwrap();
        assert_eq!(outcome.record().id, "srv-0");
        assert!(recorder.log().all().is_empty());
        assert_eq!(service.stored().len(), 1);
        assert_eq!(drain(&mut rx), 1);
    }

    #[tokio::test]
    async fn failed_submission_is_queued_once() {
        let service = FakeService::signed_in();
        service.set_failing(true);
        let recorder = SessionRecorder::new(
            service.clone(),
            MemoryStore::new(),
            NotificationBus::new(),
        );
        let mut rx = recorder.bus().subscribe();

        let outcome = recorder.record(SessionKind::Work, 25).await.unwrap();
        assert!(matches!(outcome, RecordOutcome::Queued { .. }));
        assert_eq!(recorder.log().outbox().len(), 1);
        assert!(recorder.log().list().is_empty());
        assert_eq!(drain(&mut rx), 1);
    }

    #[tokio::test]
    async fn flush_submits_queue_after_recovery() {
        let service = FakeService::signed_in();
        service.set_failing(true);
        let recorder = SessionRecorder::new(
            service.clone(),
            MemoryStore::new(),
            NotificationBus::new(),
        );
        recorder.record(SessionKind::Work, 25).await.unwrap();
        recorder.record(SessionKind::Break, 5).await.unwrap();

        let report = recorder.flush_outbox().await.unwrap();
        assert_eq!(report.submitted, 0);
        assert_eq!(report.remaining, 2);
        assert!(report.error.is_some());

        service.set_failing(false);
        let mut rx = recorder.bus().subscribe();
        let report = recorder.flush_outbox().await.unwrap();
        assert_eq!(report.submitted, 2);
        assert_eq!(report.remaining, 0);
        assert!(recorder.log().outbox().is_empty());
        assert_eq!(service.stored()[0].kind, SessionKind::Work);
        assert_eq!(drain(&mut rx), 1);
    }

    #[tokio::test]
    async fn history_falls_back_to_local_when_unreachable() {
        let service = FakeService::signed_in();
        let recorder = SessionRecorder::new(
            service.clone(),
            MemoryStore::new(),
            NotificationBus::new(),
        );
        recorder.record(SessionKind::Work, 25).await.unwrap();
        service.set_failing(true);
        recorder.record(SessionKind::Break, 5).await.unwrap();

        let history = recorder.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, SessionKind::Break);

        service.set_failing(false);
        let history = recorder.history().await;
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn runner_records_every_completion() {
        let store = MemoryStore::new();
        let recorder = SessionRecorder::new(OfflineService, store, NotificationBus::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_recorder(recorder, rx));

        for kind in [SessionKind::Work, SessionKind::Break] {
            tx.send(PhaseCompletion {
                kind,
                duration_minutes: 1,
                completed_at: Utc::now(),
            })
            .unwrap();
        }
        drop(tx);

        let recorder = handle.await.unwrap();
        let kinds: Vec<_> = recorder.log().list().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![SessionKind::Work, SessionKind::Break]);
    }
}
