use clap::Subcommand;
use repcount_core::{ConfigStore, Event, HistoryStore, WorkoutSession};

use super::sync::forward_completed_session;

const SESSION_KEY: &str = "workout_session";

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Start a workout with the configured settings
    Start,
    /// Log a completed set and start the rest countdown
    Set {
        /// Repetitions completed in this set
        reps: u32,
    },
    /// Skip the current rest
    SkipRest,
    /// Extend the current rest (also raises the configured default)
    AddRest {
        /// Seconds to add
        secs: u32,
    },
    /// Pause the session
    Pause,
    /// Resume a paused session
    Resume,
    /// Print current session state as JSON (ticks the rest timer first)
    Status,
    /// End the workout and record it to history
    End,
    /// Dismiss the summary, returning to setup
    Dismiss,
}

fn load_session(history: &HistoryStore, config_store: &ConfigStore) -> WorkoutSession {
    if let Ok(Some(json)) = history.kv_get(SESSION_KEY) {
        if let Ok(session) = serde_json::from_str::<WorkoutSession>(&json) {
            return session;
        }
    }
    WorkoutSession::new(config_store.load_or_default())
}

fn save_session(
    history: &HistoryStore,
    session: &WorkoutSession,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(session)?;
    history.kv_set(SESSION_KEY, &json)?;
    Ok(())
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    let history = HistoryStore::open()?;
    let config_store = ConfigStore::open()?;
    let mut session = load_session(&history, &config_store);

    match action {
        WorkoutAction::Start => {
            session.set_config(config_store.load_or_default());
            match session.start_workout() {
                Some(event) => print_event(&event)?,
                None => eprintln!("workout not started (already active or invalid config)"),
            }
        }
        WorkoutAction::Set { reps } => match session.complete_set(reps) {
            Some(event) => print_event(&event)?,
            None => eprintln!("no active set to complete"),
        },
        WorkoutAction::SkipRest => match session.skip_rest() {
            Some(event) => print_event(&event)?,
            None => eprintln!("not resting"),
        },
        WorkoutAction::AddRest { secs } => match session.add_rest_time(secs) {
            Some(event) => {
                // The raise is permanent: persist the new default.
                config_store.save(session.config())?;
                print_event(&event)?;
            }
            None => eprintln!("not resting"),
        },
        WorkoutAction::Pause => match session.pause() {
            Some(event) => print_event(&event)?,
            None => eprintln!("nothing to pause"),
        },
        WorkoutAction::Resume => match session.resume() {
            Some(event) => print_event(&event)?,
            None => eprintln!("not paused"),
        },
        WorkoutAction::Status => {
            if let Some(event) = session.tick() {
                print_event(&event)?;
            }
            print_event(&session.snapshot())?;
        }
        WorkoutAction::End => match session.end_workout() {
            Some(event) => {
                if let Some(record) = session.session_record() {
                    history.append(&record)?;
                    // Best effort: an unreachable peer queues durably.
                    forward_completed_session(&record, session.config());
                }
                print_event(&event)?;
            }
            None => eprintln!("no workout in progress"),
        },
        WorkoutAction::Dismiss => match session.dismiss_summary() {
            Some(event) => print_event(&event)?,
            None => eprintln!("no summary to dismiss"),
        },
    }

    save_session(&history, &session)?;
    Ok(())
}
