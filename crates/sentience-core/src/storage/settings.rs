//! Persisted timer snapshot.
//!
//! One named entry per field, each holding a JSON-serialized primitive.
//! Loading is permissive: a missing or unparseable field falls back to its
//! default without surfacing an error, and a failing store yields the full
//! defaults. Saving writes all fields in one batch.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::kv::KeyValueStore;
use crate::error::StoreError;
use crate::timer::{Phase, DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

pub const KEY_WORK_DURATION: &str = "timer.work_duration";
pub const KEY_BREAK_DURATION: &str = "timer.break_duration";
pub const KEY_PHASE: &str = "timer.phase";
pub const KEY_SECONDS_REMAINING: &str = "timer.seconds_remaining";
pub const KEY_IS_RUNNING: &str = "timer.is_running";
pub const KEY_SESSIONS_COMPLETED: &str = "timer.sessions_completed";
pub const KEY_TOTAL_FOCUS_SECONDS: &str = "timer.total_focus_seconds";
pub const KEY_SOUND_ENABLED: &str = "timer.sound_enabled";
pub const KEY_AMBIENT_SOUND_ENABLED: &str = "timer.ambient_sound_enabled";
pub const KEY_DISTRACTION_BLOCKER_ENABLED: &str = "timer.distraction_blocker_enabled";

/// Subset of the timer state needed to resume across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub work_duration: u32,
    pub break_duration: u32,
    pub phase: Phase,
    pub seconds_remaining: u32,
    pub is_running: bool,
    pub sessions_completed: u32,
    pub total_focus_seconds: u64,
    pub sound_enabled: bool,
    pub ambient_sound_enabled: bool,
    pub distraction_blocker_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_duration: DEFAULT_WORK_MINUTES,
            break_duration: DEFAULT_BREAK_MINUTES,
            phase: Phase::Working,
            seconds_remaining: DEFAULT_WORK_MINUTES * 60,
            is_running: false,
            sessions_completed: 0,
            total_focus_seconds: 0,
            sound_enabled: true,
            ambient_sound_enabled: false,
            distraction_blocker_enabled: false,
        }
    }
}

/// Reads and writes the single settings snapshot of a profile.
pub struct SettingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Last saved snapshot, or the defaults for anything missing or corrupt.
    ///
    /// If the store itself fails to read, the whole snapshot falls back to
    /// the defaults rather than mixing stored and default fields.
    pub fn load(&self) -> TimerSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "failed to read settings, using defaults");
                TimerSettings::default()
            }
        }
    }

    /// Overwrite the snapshot in one batch. Idempotent.
    pub fn save(&self, settings: &TimerSettings) -> Result<(), StoreError> {
        let entries = [
            encode(KEY_WORK_DURATION, &settings.work_duration)?,
            encode(KEY_BREAK_DURATION, &settings.break_duration)?,
            encode(KEY_PHASE, &settings.phase)?,
            encode(KEY_SECONDS_REMAINING, &settings.seconds_remaining)?,
            encode(KEY_IS_RUNNING, &settings.is_running)?,
            encode(KEY_SESSIONS_COMPLETED, &settings.sessions_completed)?,
            encode(KEY_TOTAL_FOCUS_SECONDS, &settings.total_focus_seconds)?,
            encode(KEY_SOUND_ENABLED, &settings.sound_enabled)?,
            encode(KEY_AMBIENT_SOUND_ENABLED, &settings.ambient_sound_enabled)?,
            encode(
                KEY_DISTRACTION_BLOCKER_ENABLED,
                &settings.distraction_blocker_enabled,
            )?,
        ];
        self.store.set_many(&entries)
    }

    /// Zero the session and focus-time counters in the stored snapshot.
    pub fn clear_statistics(&self) -> Result<TimerSettings, StoreError> {
        let mut settings = self.load();
        settings.sessions_completed = 0;
        settings.total_focus_seconds = 0;
        self.save(&settings)?;
        Ok(settings)
    }

    fn try_load(&self) -> Result<TimerSettings, StoreError> {
        let defaults = TimerSettings::default();
        let work_duration = self.field(KEY_WORK_DURATION, defaults.work_duration)?;
        let break_duration = self.field(KEY_BREAK_DURATION, defaults.break_duration)?;
        let phase = self.field(KEY_PHASE, defaults.phase)?;
        // Missing remaining time means a full phase at the loaded duration.
        let full_phase = match phase {
            Phase::Working => work_duration,
            Phase::Break => break_duration,
        }
        .saturating_mul(60);
        Ok(TimerSettings {
            work_duration,
            break_duration,
            phase,
            seconds_remaining: self.field(KEY_SECONDS_REMAINING, full_phase)?,
            is_running: self.field(KEY_IS_RUNNING, defaults.is_running)?,
            sessions_completed: self.field(KEY_SESSIONS_COMPLETED, defaults.sessions_completed)?,
            total_focus_seconds: self
                .field(KEY_TOTAL_FOCUS_SECONDS, defaults.total_focus_seconds)?,
            sound_enabled: self.field(KEY_SOUND_ENABLED, defaults.sound_enabled)?,
            ambient_sound_enabled: self
                .field(KEY_AMBIENT_SOUND_ENABLED, defaults.ambient_sound_enabled)?,
            distraction_blocker_enabled: self.field(
                KEY_DISTRACTION_BLOCKER_ENABLED,
                defaults.distraction_blocker_enabled,
            )?,
        })
    }

    /// Stored value, or `default` when missing or unparseable.
    fn field<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StoreError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(default);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(key, error = %e, "unparseable setting, using default");
                Ok(default)
            }
        }
    }
}

fn encode<T: Serialize>(
    key: &'static str,
    value: &T,
) -> Result<(&'static str, String), StoreError> {
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    Ok((key, raw))
}
