//! Application configuration.
//!
//! Loaded from a TOML file, then overridden by `USERS_*` environment
//! variables. Every field has a default so an empty file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use users_store::StoreConfig;

pub const ENV_DATABASE: &str = "USERS_DATABASE";
pub const ENV_LINK_DOMAIN: &str = "USERS_LINK_DOMAIN";
pub const ENV_SQLITE_URL: &str = "USERS_SQLITE_URL";
pub const ENV_LOG_LEVEL: &str = "USERS_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Registry name of the storage backend to select
    pub database: String,
    /// Host (and optional port) used in HATEOAS links
    pub link_domain: String,
    pub sqlite: SqliteConfig,
    pub startup: StartupConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: users_store::MEMORY_BACKEND.to_string(),
            link_domain: "user".to_string(),
            sqlite: SqliteConfig::default(),
            startup: StartupConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    pub url: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            url: users_store::DEFAULT_SQLITE_URL.to_string(),
        }
    }
}

/// Backend selection retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 5,
            retry_delay_ms: 1000,
        }
    }
}

impl StartupConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `users_core=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Read a TOML file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Unset keys leave the value
    /// alone; a set but empty `USERS_DATABASE` clears the backend name.
    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database = database;
        }
        if let Some(domain) = lookup(ENV_LINK_DOMAIN) {
            self.link_domain = domain;
        }
        if let Some(url) = lookup(ENV_SQLITE_URL) {
            self.sqlite.url = url;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        self
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            sqlite_url: self.sqlite.url.clone(),
        }
    }
}
