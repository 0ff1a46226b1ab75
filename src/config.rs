// src/config.rs
//! Configuration file support.
//!
//! Looked up at `<config dir>/competitive_logger/config.toml` unless a path is
//! given explicitly. Every field is optional.

use crate::error::{Error, Result};
use crate::sink::Redactor;
use crate::sink::redact::{DEFAULT_PLACEHOLDER, DEFAULT_SENTINEL};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter for the real output, in `env_logger` syntax.
    pub log_level: String,
    pub redaction: RedactionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub sentinel: String,
    pub placeholder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            redaction: RedactionConfig::default(),
        }
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("competitive_logger").join("config.toml"))
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn redactor(&self) -> Redactor {
        Redactor::new(&self.redaction.sentinel, &self.redaction.placeholder)
    }

    /// An `env_logger` builder with `log_level` applied as its filter.
    ///
    /// The filter string is handed to `env_logger` as is, so anything it
    /// accepts (per-module levels, `/regex` suffixes) works here too.
    pub fn logger_builder(&self) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&self.log_level);
        builder
    }
}
