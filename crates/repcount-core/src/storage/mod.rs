//! On-device persistence: TOML config and SQLite history.

mod config;
mod history;

pub use config::{ConfigStore, WorkoutConfig};
pub use history::{HistoryStore, SessionRecord};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/repcount[-dev]/` based on REPCOUNT_ENV.
///
/// `REPCOUNT_DATA_DIR` overrides the location outright, which keeps tests
/// and scripted runs away from the real data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = if let Ok(explicit) = std::env::var("REPCOUNT_DATA_DIR") {
        PathBuf::from(explicit)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("REPCOUNT_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("repcount-dev")
        } else {
            base_dir.join("repcount")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
