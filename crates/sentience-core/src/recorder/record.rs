use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::SessionKind;

/// Durable log entry marking the completion of one phase.
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSessionRecord {
    /// Server-assigned when synced, `local-<millis>` when recorded offline.
    #[serde(alias = "_id")]
    pub id: String,
    pub date: DateTime<Utc>,
    /// Minutes; the configured duration of the completed phase.
    pub duration: u32,
    #[serde(rename = "type")]
    pub kind: SessionKind,
}

/// Body of a session submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub date: DateTime<Utc>,
    pub duration: u32,
    #[serde(rename = "type")]
    pub kind: SessionKind,
}

impl SessionDraft {
    pub fn new(kind: SessionKind, duration: u32, date: DateTime<Utc>) -> Self {
        Self {
            date,
            duration,
            kind,
        }
    }

    pub fn with_id(&self, id: impl Into<String>) -> FocusSessionRecord {
        FocusSessionRecord {
            id: id.into(),
            date: self.date,
            duration: self.duration,
            kind: self.kind,
        }
    }
}

impl From<&FocusSessionRecord> for SessionDraft {
    fn from(record: &FocusSessionRecord) -> Self {
        Self {
            date: record.date,
            duration: record.duration,
            kind: record.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_serializes_wire_shape() {
        let date = "2026-03-01T09:30:00Z".parse().unwrap();
        let draft = SessionDraft::new(SessionKind::Work, 25, date);
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["type"], "work");
        assert_eq!(json["duration"], 25);
        assert_eq!(json["date"], "2026-03-01T09:30:00Z");
    }

    #[test]
    fn record_accepts_server_id_field() {
        let json = r#"{"_id":"65f0c0ffee","date":"2026-03-01T09:30:00.000Z","duration":5,"type":"break","user":"u1"}"#;
        let record: FocusSessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "65f0c0ffee");
        assert_eq!(record.kind, SessionKind::Break);
        assert_eq!(record.duration, 5);
    }
}
