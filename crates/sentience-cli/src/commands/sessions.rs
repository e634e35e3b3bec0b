use std::path::PathBuf;

use clap::Subcommand;
use sentience_core::storage::LocalStore;
use sentience_core::Config;

use super::{print_json, recorder};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List recorded sessions, oldest first
    List,
    /// Retry sessions whose remote submission failed
    Sync,
    /// Export local and queued sessions as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete local and queued sessions
    Clear,
}

pub async fn run(
    action: SessionsAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = LocalStore::open()?;
    let recorder = recorder(config, &store)?;

    match action {
        SessionsAction::List => {
            print_json(&recorder.history().await)?;
        }
        SessionsAction::Sync => {
            let report = recorder.flush_outbox().await?;
            print_json(&report)?;
        }
        SessionsAction::Export { out } => {
            let export = recorder.export();
            match out {
                Some(path) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&export)?)?;
                    let count = export.sessions.len() + export.outbox.len();
                    println!("exported {count} sessions to {}", path.display());
                }
                None => print_json(&export)?,
            }
        }
        SessionsAction::Clear => {
            let removed = recorder.clear_local()?;
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
    }
    Ok(())
}
