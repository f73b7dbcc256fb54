mod config;
pub mod database;
pub mod kv;

pub use config::{Config, DisplayConfig, LedgerConfig, TimerConfig};
pub use database::Database;
pub use kv::{KvStore, MemoryStore};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the directory holding `flexcounter.db` and `config.toml`.
///
/// `FLEXCOUNTER_HOME` wins when set. Otherwise `~/.config/flexcounter[-dev]/`
/// based on FLEXCOUNTER_ENV (set FLEXCOUNTER_ENV=dev for the development
/// data directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("FLEXCOUNTER_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FLEXCOUNTER_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("flexcounter-dev")
            } else {
                base_dir.join("flexcounter")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
