use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "repcount-cli", version, about = "RepCount CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Workout session control
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Workout history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Interval training timer (HIIT, Tabata, custom rounds)
    Interval {
        #[command(subcommand)]
        action: commands::interval::IntervalAction,
    },
    /// Companion-device sync
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Workout { action } => commands::workout::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Interval { action } => commands::interval::run(action),
        Commands::Sync { action } => commands::sync::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
