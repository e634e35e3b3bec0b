//! Ambient feedback driver.
//!
//! Keeps a continuous tone playing while the timer runs with ambient sound
//! enabled, and plays a short chime on phase completion when sound is on.
//! At most one tone is active at a time.

#[cfg(feature = "audio")]
mod sine;

#[cfg(feature = "audio")]
pub use sine::SineTone;

use tracing::{debug, warn};

use crate::error::AudioError;

/// Something that can play (and stop) a continuous tone.
pub trait ToneGenerator {
    fn start(&mut self) -> Result<(), AudioError>;
    fn stop(&mut self);
    /// One-shot completion sound.
    fn chime(&mut self) {}
}

/// Generator without an audio device. Tracks what would be playing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SilentTone {
    playing: bool,
    starts: u32,
    chimes: u32,
}

impl SilentTone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }

    pub fn chimes(&self) -> u32 {
        self.chimes
    }
}

impl ToneGenerator for SilentTone {
    fn start(&mut self) -> Result<(), AudioError> {
        self.playing = true;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn chime(&mut self) {
        self.chimes += 1;
    }
}

pub struct AmbientDriver<G> {
    generator: G,
    active: bool,
    /// Set after a failed start; cleared once the tone is no longer wanted.
    start_failed: bool,
}

impl<G: ToneGenerator> AmbientDriver<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            active: false,
            start_failed: false,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start the tone when both inputs hold, stop it otherwise. Idempotent.
    ///
    /// Returns whether a tone is active afterwards.
    pub fn ensure_tone_for(&mut self, is_running: bool, ambient_enabled: bool) -> bool {
        let wanted = is_running && ambient_enabled;
        if !wanted {
            self.start_failed = false;
            if self.active {
                self.generator.stop();
                self.active = false;
                debug!("ambient tone stopped");
            }
            return false;
        }

        if !self.active && !self.start_failed {
            match self.generator.start() {
                Ok(()) => {
                    self.active = true;
                    debug!("ambient tone started");
                }
                Err(e) => {
                    warn!(error = %e, "ambient tone unavailable");
                    self.start_failed = true;
                }
            }
        }
        self.active
    }

    /// The phase ended: stop the tone, chime if sound is enabled.
    ///
    /// The caller re-evaluates `ensure_tone_for` for the next phase.
    pub fn on_phase_complete(&mut self, sound_enabled: bool) {
        if self.active {
            self.generator.stop();
            self.active = false;
        }
        if sound_enabled {
            self.generator.chime();
        }
    }

    /// Teardown: stop and forget any tone.
    ///
    /// Always reaches the generator, so a device opened only for a chime
    /// is closed as well.
    pub fn release(&mut self) {
        self.generator.stop();
        self.active = false;
        self.start_failed = false;
    }
}
