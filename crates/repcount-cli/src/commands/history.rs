use clap::Subcommand;
use repcount_core::HistoryStore;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded workouts, newest first
    List {
        /// Emit raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete all recorded workouts
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let history = HistoryStore::open()?;
    match action {
        HistoryAction::List { json } => {
            let records = history.read_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            if records.is_empty() {
                println!("no workouts recorded");
                return Ok(());
            }
            for record in records {
                let sets: Vec<String> =
                    record.sets.iter().map(|s| s.reps.to_string()).collect();
                println!(
                    "{}  {} reps in {} set(s) [{}], {}s rest",
                    record.completed_at.format("%Y-%m-%d %H:%M"),
                    record.total_reps(),
                    record.sets.len(),
                    sets.join(", "),
                    record.total_rest_secs
                );
            }
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("history cleared");
        }
    }
    Ok(())
}
