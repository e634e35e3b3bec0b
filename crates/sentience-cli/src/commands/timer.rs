use std::time::Duration;

use clap::Subcommand;
use sentience_core::storage::LocalStore;
use sentience_core::{run_recorder, Config, Event, FocusContext, SilentTone, ToneGenerator};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::{print_json, recorder};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// Stop and refill the current phase
    Reset,
    /// Set the work phase duration
    Work {
        /// Minutes, at least 1
        minutes: u32,
    },
    /// Set the break phase duration
    Break {
        /// Minutes, at least 1
        minutes: u32,
    },
    /// Toggle the completion chime
    Sound,
    /// Toggle the ambient tone
    Ambient,
    /// Toggle the distraction blocker flag
    Blocker,
    /// Fast-forward a running timer and record any completed phases
    Advance {
        seconds: u64,
    },
    /// Drive the timer in the foreground, one tick per second, until Ctrl-C
    Run,
}

pub async fn run(action: TimerAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let action = match action {
        TimerAction::Run => return run_foreground(config).await,
        other => other,
    };

    let store = LocalStore::open()?;
    let (tx, rx) = mpsc::unbounded_channel();
    let mut ctx = FocusContext::open(&store, SilentTone::new(), tx);
    let mut completed = Vec::new();

    match action {
        TimerAction::Status | TimerAction::Run => {}
        TimerAction::Start => {
            ctx.start()?;
        }
        TimerAction::Pause => {
            ctx.pause()?;
        }
        TimerAction::Toggle => {
            ctx.toggle()?;
        }
        TimerAction::Reset => {
            ctx.reset()?;
        }
        TimerAction::Work { minutes } => {
            ctx.set_work_duration(minutes)?;
        }
        TimerAction::Break { minutes } => {
            ctx.set_break_duration(minutes)?;
        }
        TimerAction::Sound => {
            ctx.toggle_sound()?;
        }
        TimerAction::Ambient => {
            ctx.toggle_ambient_sound()?;
        }
        TimerAction::Blocker => {
            ctx.toggle_distraction_blocker()?;
        }
        TimerAction::Advance { seconds } => {
            completed = ctx.advance(seconds)?;
        }
    }

    let snapshot = ctx.snapshot();
    ctx.close()?;

    if completed.is_empty() {
        print_json(&snapshot)?;
    } else {
        run_recorder(recorder(config, &store)?, rx).await;
        let events: Vec<Event> = completed.iter().map(Event::from).collect();
        print_json(&serde_json::json!({ "completed": events, "state": snapshot }))?;
    }
    Ok(())
}

async fn run_foreground(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = LocalStore::open()?;
    let (tx, rx) = mpsc::unbounded_channel();
    let recorder_task = tokio::spawn(run_recorder(recorder(config, LocalStore::open()?)?, rx));

    let mut ctx = FocusContext::open(&store, tone(config), tx);
    ctx.start()?;
    print_json(&ctx.snapshot())?;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(done) = ctx.tick()? {
                    print_json(&Event::from(&done))?;
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    info!("stopping timer loop");
    let snapshot = ctx.snapshot();
    ctx.close()?;
    recorder_task.await?;
    print_json(&snapshot)?;
    Ok(())
}

#[cfg(feature = "audio")]
fn tone(config: &Config) -> impl ToneGenerator {
    sentience_core::SineTone::new(&config.ambient)
}

#[cfg(not(feature = "audio"))]
fn tone(_config: &Config) -> impl ToneGenerator {
    SilentTone::new()
}
