mod config;
pub mod database;
pub mod state;

pub use config::{ApiConfig, Config, NotificationsConfig, RemindersConfig, MAX_EVENT_LEAD_MINUTES};
pub use database::{Database, Scope};
pub use state::{keys, StateStore};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the directory holding `config.toml` and `eldercare.db`.
///
/// `ELDERCARE_HOME` wins when set. Otherwise `~/.config/eldercare[-dev]/`,
/// with the `-dev` suffix selected by `ELDERCARE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("ELDERCARE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("ELDERCARE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("eldercare-dev")
            } else {
                base_dir.join("eldercare")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
