//! Focus context: the one owner of timer, settings and ambient state.
//!
//! Every command goes through `FocusContext`, which keeps the three in step:
//! after each timer mutation the ambient tone is re-evaluated and the
//! snapshot is saved if it changed. Completed phases leave through an
//! unbounded channel so recording never blocks the countdown.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::ambient::{AmbientDriver, ToneGenerator};
use crate::error::StoreError;
use crate::events::Event;
use crate::storage::{KeyValueStore, SettingsStore, TimerSettings};
use crate::timer::{FocusTimer, PhaseCompletion};

pub struct FocusContext<S: KeyValueStore, G: ToneGenerator> {
    timer: FocusTimer,
    settings: SettingsStore<S>,
    ambient: AmbientDriver<G>,
    completions: mpsc::UnboundedSender<PhaseCompletion>,
    saved: TimerSettings,
}

impl<S: KeyValueStore, G: ToneGenerator> FocusContext<S, G> {
    /// Load the stored snapshot and seed the timer from it.
    ///
    /// A snapshot saved while running resumes running, and the tone follows.
    pub fn open(
        store: S,
        tone: G,
        completions: mpsc::UnboundedSender<PhaseCompletion>,
    ) -> Self {
        let settings = SettingsStore::new(store);
        let saved = settings.load();
        let timer = FocusTimer::from_settings(&saved);
        debug!(
            phase = timer.phase().as_str(),
            seconds_remaining = timer.seconds_remaining(),
            running = timer.is_running(),
            "focus context opened"
        );
        let mut ctx = Self {
            timer,
            settings,
            ambient: AmbientDriver::new(tone),
            completions,
            saved,
        };
        ctx.ensure_tone();
        ctx
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn ambient(&self) -> &AmbientDriver<G> {
        &self.ambient
    }

    pub fn snapshot(&self) -> Event {
        self.timer.snapshot()
    }

    pub fn start(&mut self) -> Result<Option<Event>, StoreError> {
        let event = self.timer.start();
        self.after_command()?;
        Ok(event)
    }

    pub fn pause(&mut self) -> Result<Option<Event>, StoreError> {
        let event = self.timer.pause();
        self.after_command()?;
        Ok(event)
    }

    pub fn toggle(&mut self) -> Result<Option<Event>, StoreError> {
        let event = self.timer.toggle();
        self.after_command()?;
        Ok(event)
    }

    pub fn reset(&mut self) -> Result<Event, StoreError> {
        let event = self.timer.reset();
        self.after_command()?;
        Ok(event)
    }

    pub fn set_work_duration(&mut self, minutes: u32) -> Result<Event, StoreError> {
        let event = self.timer.set_work_duration(minutes);
        self.after_command()?;
        Ok(event)
    }

    pub fn set_break_duration(&mut self, minutes: u32) -> Result<Event, StoreError> {
        let event = self.timer.set_break_duration(minutes);
        self.after_command()?;
        Ok(event)
    }

    pub fn toggle_sound(&mut self) -> Result<Event, StoreError> {
        let event = self.timer.toggle_sound();
        self.after_command()?;
        Ok(event)
    }

    pub fn toggle_ambient_sound(&mut self) -> Result<Event, StoreError> {
        let event = self.timer.toggle_ambient_sound();
        self.after_command()?;
        Ok(event)
    }

    pub fn toggle_distraction_blocker(&mut self) -> Result<Event, StoreError> {
        let event = self.timer.toggle_distraction_blocker();
        self.after_command()?;
        Ok(event)
    }

    /// Zero the session and focus-time counters.
    pub fn clear_statistics(&mut self) -> Result<(), StoreError> {
        self.timer.clear_statistics();
        self.persist()
    }

    /// One elapsed second.
    pub fn tick(&mut self) -> Result<Option<PhaseCompletion>, StoreError> {
        let completion = self.timer.tick();
        if let Some(done) = &completion {
            info!(
                kind = done.kind.as_str(),
                minutes = done.duration_minutes,
                next = self.timer.phase().as_str(),
                "phase completed"
            );
            if self.completions.send(done.clone()).is_err() {
                warn!(
                    kind = done.kind.as_str(),
                    "session recorder gone, completion not recorded"
                );
            }
            self.ambient.on_phase_complete(self.timer.sound_enabled());
        }
        self.after_command()?;
        Ok(completion)
    }

    /// `seconds` ticks in a row; stops early once the timer is paused.
    pub fn advance(&mut self, seconds: u64) -> Result<Vec<PhaseCompletion>, StoreError> {
        let mut completions = Vec::new();
        for _ in 0..seconds {
            if !self.timer.is_running() {
                break;
            }
            if let Some(done) = self.tick()? {
                completions.push(done);
            }
        }
        Ok(completions)
    }

    /// Save the snapshot if it differs from the last saved one.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let current = self.timer.settings();
        if current == self.saved {
            return Ok(());
        }
        self.settings.save(&current)?;
        self.saved = current;
        Ok(())
    }

    /// Stop any tone and write the final snapshot.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.ambient.release();
        self.persist()
    }

    fn ensure_tone(&mut self) {
        self.ambient.ensure_tone_for(
            self.timer.is_running(),
            self.timer.ambient_sound_enabled(),
        );
    }

    fn after_command(&mut self) -> Result<(), StoreError> {
        self.ensure_tone();
        self.persist()
    }
}

impl<S: KeyValueStore, G: ToneGenerator> Drop for FocusContext<S, G> {
    fn drop(&mut self) {
        self.ambient.release();
    }
}
