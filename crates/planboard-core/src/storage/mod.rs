mod config;
pub mod task_store;

pub use config::{
    CalendarConfig, Config, DragConfig, FailurePolicy, PersistenceConfig, RolloverConfig,
};
pub use task_store::{JsonFileStore, TaskStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/planboard[-dev]/` based on PLANBOARD_ENV.
///
/// Set PLANBOARD_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PLANBOARD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("planboard-dev")
    } else {
        base_dir.join("planboard")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
