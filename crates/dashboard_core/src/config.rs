//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where the dashboard database and logs live.
//! - Load settings from TOML with defaults for every missing key.
//!
//! # Invariants
//! - A loaded config has passed `validate()`.

use crate::import::backup::backup_file_name;
use crate::logging::{default_log_level, parse_level};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DB_FILE: &str = "dashboard.sqlite3";
const DEFAULT_PRODUCT_NAME: &str = "dashboard";
const DEFAULT_EXPORT_EXTENSION: &str = "json";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config TOML: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// SQLite database file holding all four collections.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Absolute log directory; logging stays off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// `trace|debug|info|warn|error`; the build default when unset.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Prefix of exported backup file names.
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default = "default_export_extension")]
    pub export_extension: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_dir: None,
            log_level: None,
            product_name: default_product_name(),
            export_extension: default_export_extension(),
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path must not be empty".to_string()));
        }
        if self.product_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "product_name must not be empty".to_string(),
            ));
        }
        if let Some(level) = &self.log_level {
            parse_level(level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        }
        if self.export_extension.trim().trim_start_matches('.').is_empty() {
            return Err(ConfigError::Invalid(
                "export_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(default_log_level())
    }

    /// Backup file name for an export taken on `date`.
    pub fn backup_file_name(&self, date: NaiveDate) -> String {
        backup_file_name(&self.product_name, date, &self.export_extension)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE)
}

fn default_product_name() -> String {
    DEFAULT_PRODUCT_NAME.to_string()
}

fn default_export_extension() -> String {
    DEFAULT_EXPORT_EXTENSION.to_string()
}
