pub mod config;
pub mod insights;
pub mod sessions;
pub mod stats;
pub mod timer;

use serde::Serialize;
use sentience_core::{
    Config, HttpSessionService, KeyValueStore, NotificationBus, RemoteError, SessionRecorder,
};

/// Recorder against the configured session service. Offline when no token is set.
pub fn recorder<S: KeyValueStore>(
    config: &Config,
    store: S,
) -> Result<SessionRecorder<HttpSessionService, S>, RemoteError> {
    let service = HttpSessionService::new(&config.remote)?;
    Ok(SessionRecorder::new(service, store, NotificationBus::new()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
