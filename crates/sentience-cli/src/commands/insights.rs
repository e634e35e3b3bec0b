use std::path::PathBuf;

use sentience_core::storage::LocalStore;
use sentience_core::{compute_insights_now, ActivitySnapshot, Config};

use super::{print_json, recorder};

/// Scores over the snapshot file plus every recorded focus session.
pub async fn run(
    input: Option<PathBuf>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let activity: ActivitySnapshot = match input {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(&path)?)?,
        None => ActivitySnapshot::default(),
    };

    let store = LocalStore::open()?;
    let focus = recorder(config, &store)?.history().await;

    let insights = compute_insights_now(
        &activity.tasks,
        &activity.moods,
        &activity.study_sessions,
        &focus,
    );
    print_json(&insights)?;
    Ok(())
}
