mod engine;
mod phase;

pub use engine::{FocusTimer, PhaseCompletion, DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};
pub use phase::{Phase, SessionKind};
