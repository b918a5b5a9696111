//! Settings errors
//!
//! File errors carry the path they happened on; validation errors name the
//! dotted key of the offending value (`polling.interval_ms`).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Loading or saving a configuration file failed
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Cannot write config file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Cannot create config directory {}: {source}", path.display())]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Cannot encode config as TOML: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// A configuration that parsed but cannot be used
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Only `.json` and `.toml` are understood
    #[error("Unsupported config file type: {}", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("Value out of range for '{key}': {value}")]
    OutOfRange { key: String, value: String },

    #[error("No config directory on this platform")]
    NoConfigDirectory,
}

impl ConfigError {
    pub(crate) fn out_of_range(key: &str, value: impl ToString) -> Self {
        Self::OutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
