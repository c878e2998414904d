//! Process configuration for the card core.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - `CARDS_LOG_DIR`, when set, must be absolute.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "CARDS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CARDS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CARDS_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "cards.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{ENV_LOG_LEVEL}: {message}"),
            Self::RelativeLogDir(path) => write!(
                f,
                "{ENV_LOG_DIR} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// Rolling log file directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_dir = match read(ENV_LOG_DIR).map(PathBuf::from) {
            Some(dir) if !dir.is_absolute() => return Err(ConfigError::RelativeLogDir(dir)),
            other => other,
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }

    /// Returns a copy using `db_path` instead of the configured path.
    pub fn with_db_path(mut self, db_path: impl AsRef<Path>) -> Self {
        self.db_path = db_path.as_ref().to_path_buf();
        self
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
