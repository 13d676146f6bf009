//! Runtime configuration for a core session.
//!
//! # Responsibility
//! - Derive on-disk locations (database, logs) from one data directory.
//! - Carry the log level chosen by the embedding layer.
//!
//! # Invariants
//! - All derived paths live under `data_dir`.

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "getitdone.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Locations and logging settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl CoreConfig {
    /// Builds a config rooted at `data_dir` with the build-mode default log level.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
            data_dir,
        }
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Creates `data_dir` if it does not exist yet.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::CoreConfig;
    use std::path::Path;

    #[test]
    fn derives_paths_under_data_dir() {
        let config = CoreConfig::with_data_dir("/tmp/getitdone").log_level("warn");
        assert_eq!(config.db_path, Path::new("/tmp/getitdone/getitdone.sqlite3"));
        assert_eq!(config.log_dir, Path::new("/tmp/getitdone/logs"));
        assert_eq!(config.log_level, "warn");
    }
}
