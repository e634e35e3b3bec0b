use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tracing::warn;

use super::ToneGenerator;
use crate::error::AudioError;
use crate::storage::AmbientConfig;

const CHIME_HZ: f32 = 880.0;
const CHIME_MS: u64 = 350;

/// Continuous low sine tone on the default output device.
///
/// The output stream is opened on first use and dropped on `stop`. A chime
/// keeps it open until the next `stop`, which the driver's `release` always
/// issues.
pub struct SineTone {
    frequency_hz: f32,
    volume: f32,
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl SineTone {
    pub fn new(config: &AmbientConfig) -> Self {
        Self {
            frequency_hz: config.frequency_hz as f32,
            volume: config.volume.clamp(0.0, 1.0) as f32,
            output: None,
            sink: None,
        }
    }

    fn handle(&mut self) -> Result<&OutputStreamHandle, AudioError> {
        if self.output.is_none() {
            let opened = OutputStream::try_default()
                .map_err(|e| AudioError::Unavailable(e.to_string()))?;
            self.output = Some(opened);
        }
        match &self.output {
            Some((_, handle)) => Ok(handle),
            None => Err(AudioError::Unavailable("output stream closed".into())),
        }
    }
}

impl ToneGenerator for SineTone {
    fn start(&mut self) -> Result<(), AudioError> {
        let frequency_hz = self.frequency_hz;
        let volume = self.volume;
        let handle = self.handle()?;
        let sink = Sink::try_new(handle).map_err(|e| AudioError::Playback(e.to_string()))?;
        sink.set_volume(volume);
        sink.append(SineWave::new(frequency_hz));
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.output = None;
    }

    fn chime(&mut self) {
        let volume = (self.volume * 4.0).min(1.0);
        let played = self.handle().and_then(|handle| {
            handle
                .play_raw(
                    SineWave::new(CHIME_HZ)
                        .take_duration(Duration::from_millis(CHIME_MS))
                        .amplify(volume),
                )
                .map_err(|e| AudioError::Playback(e.to_string()))
        });
        if let Err(e) = played {
            warn!(error = %e, "completion chime failed");
        }
    }
}
