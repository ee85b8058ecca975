//! Scoring configuration files.
//!
//! A configuration file is TOML with an optional `[scoring]` table; every key
//! in it is optional and only replaces the matching default:
//!
//! ```toml
//! [scoring]
//! match_score = 1.0
//! gap_open = -3.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::scoring::{ScoringOverrides, ScoringParameters};

/// Errors that can occur while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringOverrides,
}

impl Config {
    /// Parses configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Default parameters with this file's overrides applied.
    pub fn scoring_parameters(&self) -> ScoringParameters {
        ScoringParameters::default().with_overrides(&self.scoring)
    }
}

/// Loads a configuration file from disk.
pub fn load_config<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = Config::from_toml_str(&content).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded config from {}: {:?}", path.display(), config.scoring);
    Ok(config)
}

/// Loads scoring parameters from a configuration file.
pub fn load_scoring_config<P: AsRef<Path>>(path: P) -> ConfigResult<ScoringParameters> {
    load_config(path).map(|c| c.scoring_parameters())
}
