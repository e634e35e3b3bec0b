use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, PhaseCompletion, SessionKind};

/// Which boolean preference a `ToggleChanged` event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerToggle {
    Sound,
    AmbientSound,
    DistractionBlocker,
}

/// Every timer state change produces an Event.
/// The CLI prints them; views may poll for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        kind: SessionKind,
        duration_minutes: u32,
        next_phase: Phase,
        at: DateTime<Utc>,
    },
    DurationChanged {
        phase: Phase,
        minutes: u32,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    ToggleChanged {
        toggle: TimerToggle,
        enabled: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        seconds_remaining: u32,
        is_running: bool,
        work_duration_minutes: u32,
        break_duration_minutes: u32,
        sessions_completed: u32,
        total_focus_seconds: u64,
        sound_enabled: bool,
        ambient_sound_enabled: bool,
        distraction_blocker_enabled: bool,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl From<&PhaseCompletion> for Event {
    fn from(done: &PhaseCompletion) -> Self {
        let next_phase = match done.kind {
            SessionKind::Work => Phase::Break,
            SessionKind::Break => Phase::Working,
        };
        Event::PhaseCompleted {
            kind: done.kind,
            duration_minutes: done.duration_minutes,
            next_phase,
            at: done.completed_at,
        }
    }
}

/// Payload-free "data updated" notification raised by the session recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataUpdated;
