use clap::Subcommand;
use repcount_core::ConfigStore;

use super::sync::forward_config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current settings
    Show,
    /// Update one or more settings
    Set {
        /// Target repetitions per set
        #[arg(long)]
        reps_per_set: Option<u32>,
        /// Rest duration between sets, in seconds
        #[arg(long)]
        rest_seconds: Option<u32>,
        /// Advisory total-rep goal for the session
        #[arg(long)]
        total_reps_goal: Option<u32>,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = ConfigStore::open()?;
    match action {
        ConfigAction::Show => {
            let config = store.load_or_default();
            println!("reps-per-set:    {}", config.reps_per_set);
            println!("rest-seconds:    {}", config.rest_seconds);
            println!("total-reps-goal: {}", config.total_reps_goal);
        }
        ConfigAction::Set {
            reps_per_set,
            rest_seconds,
            total_reps_goal,
        } => {
            let mut config = store.load_or_default();
            if let Some(reps) = reps_per_set {
                config.reps_per_set = reps;
            }
            if let Some(secs) = rest_seconds {
                config.rest_seconds = secs;
            }
            if let Some(goal) = total_reps_goal {
                config.total_reps_goal = goal;
            }
            store.save(&config)?;
            println!("settings saved");
            forward_config(&config);
        }
    }
    Ok(())
}
