//! Focus timer state machine.
//!
//! The timer does not own a thread or an interval. The host loop calls
//! `tick()` once per elapsed second; every mutation goes through the single
//! `FocusTimer` owner, so phase transitions are strictly serialized.
//!
//! ## State Transitions
//!
//! ```text
//! Working --(countdown hits 0)--> Break --(countdown hits 0)--> Working
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = FocusTimer::new();
//! timer.start();
//! // once per second:
//! if let Some(done) = timer.tick() { recorder_tx.send(done)?; }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::{Phase, SessionKind};
use crate::events::{Event, TimerToggle};
use crate::storage::TimerSettings;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Emitted by the tick that completes a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCompletion {
    pub kind: SessionKind,
    /// Configured duration of the phase that just completed.
    pub duration_minutes: u32,
    pub completed_at: DateTime<Utc>,
}

/// Work/break alternation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTimer {
    phase: Phase,
    seconds_remaining: u32,
    is_running: bool,
    work_duration_minutes: u32,
    break_duration_minutes: u32,
    sessions_completed: u32,
    /// Counts every running second, in both phases.
    total_focus_seconds: u64,
    sound_enabled: bool,
    ambient_sound_enabled: bool,
    distraction_blocker_enabled: bool,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self {
            phase: Phase::Working,
            seconds_remaining: DEFAULT_WORK_MINUTES * 60,
            is_running: false,
            work_duration_minutes: DEFAULT_WORK_MINUTES,
            break_duration_minutes: DEFAULT_BREAK_MINUTES,
            sessions_completed: 0,
            total_focus_seconds: 0,
            sound_enabled: true,
            ambient_sound_enabled: false,
            distraction_blocker_enabled: false,
        }
    }
}

impl FocusTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a persisted snapshot.
    ///
    /// Zero durations fall back to the defaults and the remaining time is
    /// clamped into the current phase's duration.
    pub fn from_settings(settings: &TimerSettings) -> Self {
        let work = positive_or(settings.work_duration, DEFAULT_WORK_MINUTES);
        let brk = positive_or(settings.break_duration, DEFAULT_BREAK_MINUTES);
        let mut timer = Self {
            phase: settings.phase,
            seconds_remaining: settings.seconds_remaining,
            is_running: settings.is_running,
            work_duration_minutes: work,
            break_duration_minutes: brk,
            sessions_completed: settings.sessions_completed,
            total_focus_seconds: settings.total_focus_seconds,
            sound_enabled: settings.sound_enabled,
            ambient_sound_enabled: settings.ambient_sound_enabled,
            distraction_blocker_enabled: settings.distraction_blocker_enabled,
        };
        timer.seconds_remaining = timer
            .seconds_remaining
            .min(timer.phase_duration_seconds());
        timer
    }

    /// The persisted subset of the timer state.
    pub fn settings(&self) -> TimerSettings {
        TimerSettings {
            work_duration: self.work_duration_minutes,
            break_duration: self.break_duration_minutes,
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            is_running: self.is_running,
            sessions_completed: self.sessions_completed,
            total_focus_seconds: self.total_focus_seconds,
            sound_enabled: self.sound_enabled,
            ambient_sound_enabled: self.ambient_sound_enabled,
            distraction_blocker_enabled: self.distraction_blocker_enabled,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn work_duration_minutes(&self) -> u32 {
        self.work_duration_minutes
    }

    pub fn break_duration_minutes(&self) -> u32 {
        self.break_duration_minutes
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn total_focus_seconds(&self) -> u64 {
        self.total_focus_seconds
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn ambient_sound_enabled(&self) -> bool {
        self.ambient_sound_enabled
    }

    pub fn distraction_blocker_enabled(&self) -> bool {
        self.distraction_blocker_enabled
    }

    pub fn phase_duration_minutes(&self) -> u32 {
        self.duration_minutes_of(self.phase)
    }

    pub fn phase_duration_seconds(&self) -> u32 {
        self.phase_duration_minutes().saturating_mul(60)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.phase_duration_seconds();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.seconds_remaining as f64 / total as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            is_running: self.is_running,
            work_duration_minutes: self.work_duration_minutes,
            break_duration_minutes: self.break_duration_minutes,
            sessions_completed: self.sessions_completed,
            total_focus_seconds: self.total_focus_seconds,
            sound_enabled: self.sound_enabled,
            ambient_sound_enabled: self.ambient_sound_enabled,
            distraction_blocker_enabled: self.distraction_blocker_enabled,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.is_running {
            return None;
        }
        self.is_running = true;
        Some(Event::TimerStarted {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Freeze the countdown. Never emits a session record.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.is_running = false;
        Some(Event::TimerPaused {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Stop and refill the current phase. Phase and counters are untouched.
    pub fn reset(&mut self) -> Event {
        self.is_running = false;
        self.seconds_remaining = self.phase_duration_seconds();
        Event::TimerReset {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }
    }

    pub fn set_work_duration(&mut self, minutes: u32) -> Event {
        self.work_duration_minutes = minutes.max(1);
        self.apply_duration_change(Phase::Working)
    }

    pub fn set_break_duration(&mut self, minutes: u32) -> Event {
        self.break_duration_minutes = minutes.max(1);
        self.apply_duration_change(Phase::Break)
    }

    pub fn toggle_sound(&mut self) -> Event {
        self.sound_enabled = !self.sound_enabled;
        toggle_event(TimerToggle::Sound, self.sound_enabled)
    }

    pub fn toggle_ambient_sound(&mut self) -> Event {
        self.ambient_sound_enabled = !self.ambient_sound_enabled;
        toggle_event(TimerToggle::AmbientSound, self.ambient_sound_enabled)
    }

    pub fn toggle_distraction_blocker(&mut self) -> Event {
        self.distraction_blocker_enabled = !self.distraction_blocker_enabled;
        toggle_event(
            TimerToggle::DistractionBlocker,
            self.distraction_blocker_enabled,
        )
    }

    /// Advance by one elapsed second.
    ///
    /// Returns the completion when this tick brings the countdown to zero.
    pub fn tick(&mut self) -> Option<PhaseCompletion> {
        if !self.is_running {
            return None;
        }
        self.total_focus_seconds = self.total_focus_seconds.saturating_add(1);
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return None;
        }
        Some(self.complete_phase())
    }

    /// Run `seconds` ticks, collecting every completion.
    pub fn advance(&mut self, seconds: u64) -> Vec<PhaseCompletion> {
        let mut completions = Vec::new();
        for _ in 0..seconds {
            if !self.is_running {
                break;
            }
            if let Some(done) = self.tick() {
                completions.push(done);
            }
        }
        completions
    }

    /// Zero both statistics counters. Data-management action only.
    pub fn clear_statistics(&mut self) {
        self.sessions_completed = 0;
        self.total_focus_seconds = 0;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self) -> PhaseCompletion {
        let finished = self.phase;
        let duration_minutes = self.duration_minutes_of(finished);
        if finished == Phase::Working {
            self.sessions_completed = self.sessions_completed.saturating_add(1);
        }
        self.phase = finished.next();
        self.seconds_remaining = self.phase_duration_seconds();
        PhaseCompletion {
            kind: finished.kind(),
            duration_minutes,
            completed_at: Utc::now(),
        }
    }

    fn apply_duration_change(&mut self, phase: Phase) -> Event {
        if self.phase == phase {
            let full = self.phase_duration_seconds();
            if self.is_running {
                // Keep the running countdown inside the shortened phase.
                self.seconds_remaining = self.seconds_remaining.min(full);
            } else {
                self.seconds_remaining = full;
            }
        }
        Event::DurationChanged {
            phase,
            minutes: self.duration_minutes_of(phase),
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }
    }

    fn duration_minutes_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Working => self.work_duration_minutes,
            Phase::Break => self.break_duration_minutes,
        }
    }
}

fn positive_or(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}

fn toggle_event(toggle: TimerToggle, enabled: bool) -> Event {
    Event::ToggleChanged {
        toggle,
        enabled,
        at: Utc::now(),
    }
}
