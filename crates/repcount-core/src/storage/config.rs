//! TOML-based workout configuration.
//!
//! The config is one structured value, written and read whole. Replacing
//! the old scattered per-key writes removes the torn-read case where one
//! field is updated and another is stale.
//!
//! Stored at `~/.config/repcount/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

/// Per-device workout settings.
///
/// All fields must be >= 1; invalid values are rejected at the boundary and
/// never enter a stored config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    /// Target repetitions per set.
    #[serde(default = "default_reps_per_set")]
    pub reps_per_set: u32,
    /// Rest interval between sets, in seconds.
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
    /// Total repetition goal for a session.
    #[serde(default = "default_total_reps_goal")]
    pub total_reps_goal: u32,
}

fn default_reps_per_set() -> u32 {
    10
}
fn default_rest_seconds() -> u32 {
    60
}
fn default_total_reps_goal() -> u32 {
    100
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            reps_per_set: default_reps_per_set(),
            rest_seconds: default_rest_seconds(),
            total_reps_goal: default_total_reps_goal(),
        }
    }
}

impl WorkoutConfig {
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the first field < 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("reps_per_set", self.reps_per_set),
            ("rest_seconds", self.rest_seconds),
            ("total_reps_goal", self.total_reps_goal),
        ] {
            if value < 1 {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("must be >= 1, got {value}"),
                });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Whole-value config persistence with atomic get/set semantics.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store under the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> Result<Self, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("."),
            message: e.to_string(),
        })?;
        Ok(Self::at(dir.join("config.toml")))
    }

    /// Store at an explicit path (tests, tools).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load from disk, or the defaults when no file exists yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<WorkoutConfig, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(WorkoutConfig::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            }),
        }
    }

    /// Load, falling back to defaults on any error. Never fails.
    pub fn load_or_default(&self) -> WorkoutConfig {
        self.load().unwrap_or_default()
    }

    /// Validate and persist the whole value.
    ///
    /// # Errors
    /// Returns an error if validation fails or the file cannot be written.
    pub fn save(&self, config: &WorkoutConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let content =
            toml::to_string_pretty(config).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}
