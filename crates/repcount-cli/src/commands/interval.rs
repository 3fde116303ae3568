use clap::Subcommand;
use repcount_core::{HistoryStore, IntervalPhase, IntervalPreset, IntervalTimer, SystemClock};
use serde::Serialize;

const INTERVAL_KEY: &str = "interval_timer";

#[derive(Subcommand)]
pub enum IntervalAction {
    /// List the built-in presets
    Presets,
    /// Start a preset by name, or a custom timer via the flags
    Start {
        /// Built-in preset name (e.g. "Tabata")
        preset: Option<String>,
        /// Work phase length in seconds
        #[arg(long, default_value_t = 30)]
        work: u32,
        /// Rest phase length in seconds
        #[arg(long, default_value_t = 30)]
        rest: u32,
        /// Number of rounds
        #[arg(long, default_value_t = 10)]
        rounds: u32,
    },
    /// Poll the timer and print its state as JSON
    Status,
    /// Pause the current phase
    Pause,
    /// Resume a paused timer
    Resume,
    /// Abandon the run
    Stop,
}

/// JSON view of the timer for scripted callers.
#[derive(Serialize)]
struct IntervalStatus {
    running: bool,
    paused: bool,
    phase: IntervalPhase,
    round: u32,
    total_rounds: u32,
    remaining_secs: u64,
    preset: Option<String>,
}

impl IntervalStatus {
    fn of(timer: &IntervalTimer, clock: &SystemClock) -> Self {
        Self {
            running: timer.is_running(),
            paused: timer.is_paused(),
            phase: timer.phase(),
            round: timer.round(),
            total_rounds: timer.preset().map_or(0, |p| p.rounds),
            remaining_secs: timer.remaining_secs(clock),
            preset: timer.preset().map(|p| p.name.clone()),
        }
    }
}

fn load_timer(history: &HistoryStore) -> IntervalTimer {
    if let Ok(Some(json)) = history.kv_get(INTERVAL_KEY) {
        if let Ok(timer) = serde_json::from_str::<IntervalTimer>(&json) {
            return timer;
        }
    }
    IntervalTimer::new()
}

fn save_timer(
    history: &HistoryStore,
    timer: &IntervalTimer,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(timer)?;
    history.kv_set(INTERVAL_KEY, &json)?;
    Ok(())
}

fn find_builtin(name: &str) -> Option<IntervalPreset> {
    IntervalPreset::builtins()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn run(action: IntervalAction) -> Result<(), Box<dyn std::error::Error>> {
    let history = HistoryStore::open()?;
    let clock = SystemClock;
    let mut timer = load_timer(&history);

    match action {
        IntervalAction::Presets => {
            for preset in IntervalPreset::builtins() {
                println!(
                    "{:<14} {}s work / {}s rest x {} rounds ({}s total)",
                    preset.name,
                    preset.work_seconds,
                    preset.rest_seconds,
                    preset.rounds,
                    preset.total_duration_secs()
                );
            }
        }
        IntervalAction::Start {
            preset,
            work,
            rest,
            rounds,
        } => {
            let chosen = match preset {
                Some(name) => find_builtin(&name)
                    .ok_or_else(|| format!("unknown preset '{name}' (see `interval presets`)"))?,
                None => IntervalPreset::new("Custom", work, rest, rounds),
            };
            if !timer.start(&clock, chosen) {
                eprintln!("interval not started (all values must be >= 1)");
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&IntervalStatus::of(&timer, &clock))?
            );
        }
        IntervalAction::Status => {
            if let Some(tick) = timer.tick(&clock) {
                println!("{}", serde_json::to_string_pretty(&tick)?);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&IntervalStatus::of(&timer, &clock))?
            );
        }
        IntervalAction::Pause => {
            timer.pause(&clock);
            println!(
                "{}",
                serde_json::to_string_pretty(&IntervalStatus::of(&timer, &clock))?
            );
        }
        IntervalAction::Resume => {
            timer.resume(&clock);
            println!(
                "{}",
                serde_json::to_string_pretty(&IntervalStatus::of(&timer, &clock))?
            );
        }
        IntervalAction::Stop => {
            timer.stop();
            println!("interval stopped");
        }
    }

    save_timer(&history, &timer)?;
    Ok(())
}
