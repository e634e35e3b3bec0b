use clap::Subcommand;
use sentience_core::storage::{LocalStore, SessionLog};
use sentience_core::SettingsStore;

use super::print_json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Session counter, focus time and local record count
    Show,
    /// Zero the session counter and total focus time
    Reset,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = LocalStore::open()?;
    let settings = SettingsStore::new(&store);

    match action {
        StatsAction::Show => {
            let current = settings.load();
            let log = SessionLog::new(&store);
            print_json(&serde_json::json!({
                "sessions_completed": current.sessions_completed,
                "total_focus_seconds": current.total_focus_seconds,
                "focus_minutes": current.total_focus_seconds / 60,
                "local_sessions": log.list().len(),
                "queued_sessions": log.outbox().len(),
            }))?;
        }
        StatsAction::Reset => {
            let cleared = settings.clear_statistics()?;
            print_json(&serde_json::json!({
                "sessions_completed": cleared.sessions_completed,
                "total_focus_seconds": cleared.total_focus_seconds,
            }))?;
        }
    }
    Ok(())
}
