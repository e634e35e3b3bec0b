//! Locally recorded focus sessions.
//!
//! Two JSON array entries share the profile's key-value store:
//! - `focus_sessions`: records kept locally (never submitted)
//! - `focus_sessions_outbox`: records whose remote submission failed,
//!   waiting to be retried

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::kv::KeyValueStore;
use crate::error::StoreError;
use crate::recorder::{FocusSessionRecord, SessionDraft};

pub const KEY_SESSIONS: &str = "focus_sessions";
pub const KEY_OUTBOX: &str = "focus_sessions_outbox";

const LOCAL_ID_PREFIX: &str = "local-";

/// Everything the profile holds locally, for the export action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionExport {
    pub exported_at: Option<DateTime<Utc>>,
    pub sessions: Vec<FocusSessionRecord>,
    pub outbox: Vec<FocusSessionRecord>,
}

pub struct SessionLog<S> {
    store: S,
}

impl<S: KeyValueStore> SessionLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<FocusSessionRecord> {
        self.read(KEY_SESSIONS)
    }

    pub fn outbox(&self) -> Vec<FocusSessionRecord> {
        self.read(KEY_OUTBOX)
    }

    /// Local records followed by queued ones.
    pub fn all(&self) -> Vec<FocusSessionRecord> {
        let mut records = self.list();
        records.extend(self.outbox());
        records
    }

    /// Append a locally identified record to the session list.
    pub fn append(&self, draft: &SessionDraft) -> Result<FocusSessionRecord, StoreError> {
        let record = draft.with_id(self.next_local_id(draft.date));
        let mut records = self.list();
        records.push(record.clone());
        self.write(KEY_SESSIONS, &records)?;
        Ok(record)
    }

    /// Queue a draft for a later remote submission.
    pub fn enqueue(&self, draft: &SessionDraft) -> Result<FocusSessionRecord, StoreError> {
        let record = draft.with_id(self.next_local_id(draft.date));
        let mut outbox = self.outbox();
        outbox.push(record.clone());
        self.write(KEY_OUTBOX, &outbox)?;
        Ok(record)
    }

    pub fn replace_outbox(&self, records: &[FocusSessionRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return self.store.remove(KEY_OUTBOX);
        }
        self.write(KEY_OUTBOX, records)
    }

    pub fn export(&self) -> SessionExport {
        SessionExport {
            exported_at: Some(Utc::now()),
            sessions: self.list(),
            outbox: self.outbox(),
        }
    }

    /// Delete every local record, queued ones included.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let removed = self.list().len() + self.outbox().len();
        self.store.remove(KEY_SESSIONS)?;
        self.store.remove(KEY_OUTBOX)?;
        Ok(removed)
    }

    /// Timestamp-based identifier, strictly increasing within the profile.
    fn next_local_id(&self, at: DateTime<Utc>) -> String {
        let last = self
            .all()
            .iter()
            .filter_map(|r| r.id.strip_prefix(LOCAL_ID_PREFIX)?.parse::<i64>().ok())
            .max();
        let millis = at.timestamp_millis();
        let next = match last {
            Some(last) if last >= millis => last + 1,
            _ => millis,
        };
        format!("{LOCAL_ID_PREFIX}{next}")
    }

    fn read(&self, key: &str) -> Vec<FocusSessionRecord> {
        match self.store.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                debug!(key, error = %e, "corrupt session list, treating as empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!(key, error = %e, "failed to read session list");
                Vec::new()
            }
        }
    }

    fn write(&self, key: &str, records: &[FocusSessionRecord]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records).map_err(|e| StoreError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key, &raw)
    }
}
