// Configuration for the data access layer
// Settings come from an optional TOML file; every field has a default and
// the LIGHTBNB_DATABASE environment variable overrides the database path

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `database.path`
pub const DATABASE_ENV: &str = "LIGHTBNB_DATABASE";

/// Path that opens a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Connection parameters handed to the store when it is opened
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database file, or ":memory:"
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// How long a statement waits on a locked database, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Open the database read-only
    #[serde(default)]
    pub read_only: bool,
}

/// Row caps for searches
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,

    /// Larger requested limits are clamped to this
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
}

fn default_path() -> PathBuf {
    PathBuf::from("lightbnb.db")
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_limit() -> i64 {
    crate::query::search::DEFAULT_LIMIT
}

fn default_max_limit() -> i64 {
    100
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            read_only: false,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a throwaway in-memory database
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(IN_MEMORY),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl Config {
    /// Load from a TOML file when one is given, otherwise start from defaults,
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var(DATABASE_ENV) {
            if !path.is_empty() {
                tracing::debug!(env = DATABASE_ENV, path = %path, "database path overridden");
                self.database.path = PathBuf::from(path);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.default_limit <= 0 {
            return Err(DataError::Config(
                "search.default_limit must be positive".to_string(),
            ));
        }

        if self.search.default_limit > self.search.max_limit {
            return Err(DataError::Config(format!(
                "search.default_limit ({}) exceeds search.max_limit ({})",
                self.search.default_limit, self.search.max_limit
            )));
        }

        Ok(())
    }
}
