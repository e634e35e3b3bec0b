//! # Sentience Core Library
//!
//! This library provides the core logic for the Sentience focus timer.
//! All operations are available through the standalone `sentience` CLI, which
//! is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: A work/break state machine that requires the caller to invoke
//!   `tick()` once per elapsed second
//! - **Storage**: SQLite key-value store for the timer snapshot and local
//!   session records, TOML file for configuration
//! - **Recorder**: Persists completed phases to the remote session service,
//!   or locally when offline, with an outbox for failed submissions
//! - **Ambient**: Continuous tone while focusing, chime on phase completion
//! - **Insights**: Weekly scores derived from tasks, moods, study and focus
//!   sessions
//!
//! ## Key Components
//!
//! - [`FocusContext`]: Owns the timer, its settings and the ambient driver
//! - [`FocusTimer`]: Core timer state machine
//! - [`SessionRecorder`]: Session persistence and `DataUpdated` notifications
//! - [`Config`]: Application configuration management

pub mod ambient;
pub mod error;
pub mod events;
pub mod insights;
pub mod recorder;
pub mod runtime;
pub mod storage;
pub mod timer;

pub use ambient::{AmbientDriver, SilentTone, ToneGenerator};
#[cfg(feature = "audio")]
pub use ambient::SineTone;
pub use error::{AudioError, ConfigError, RemoteError, StoreError};
pub use events::{DataUpdated, Event, TimerToggle};
pub use insights::{
    compute_insights, compute_insights_now, ActivitySnapshot, Insights, WeeklyTrend,
};
pub use recorder::{
    run_recorder, FlushReport, FocusSessionRecord, HttpSessionService, NotificationBus,
    OfflineService, RecordOutcome, SessionDraft, SessionRecorder, SessionService,
};
pub use runtime::FocusContext;
pub use storage::{Config, KeyValueStore, LocalStore, MemoryStore, SettingsStore, TimerSettings};
pub use timer::{FocusTimer, Phase, PhaseCompletion, SessionKind};
