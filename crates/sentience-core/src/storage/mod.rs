mod config;
mod kv;
mod session_log;
mod settings;

pub use config::{AmbientConfig, Config, LogConfig, RemoteConfig};
pub use kv::{KeyValueStore, LocalStore, MemoryStore};
pub use session_log::{SessionExport, SessionLog, KEY_OUTBOX, KEY_SESSIONS};
pub use settings::{SettingsStore, TimerSettings};

use std::path::PathBuf;

/// Returns the profile's data directory, creating it if needed.
///
/// `SENTIENCE_DATA_DIR` wins when set. Otherwise `~/.config/sentience[-dev]/`
/// based on SENTIENCE_ENV (set SENTIENCE_ENV=dev for the development profile).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("SENTIENCE_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("SENTIENCE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("sentience-dev")
            } else {
                base_dir.join("sentience")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
