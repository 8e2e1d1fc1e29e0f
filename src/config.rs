//! Configuration management for wolflog.
//!
//! The config file lives at `~/.config/wolflog/config.toml` and holds the
//! defaults a viewer deployment wants for every parse: the display names of
//! the registered players and how avatar paths are derived. CLI arguments
//! layer on top of it per invocation.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::{ParseOptions, DEFAULT_AVATAR_DIR, DEFAULT_NAME_MAX_LENGTH};

/// Errors from reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDirectory,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub players: PlayersConfig,
}

/// Player presentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayersConfig {
    /// Default display names for `PlayerN` remapping, 1-indexed.
    /// Empty means no remapping unless names are passed per call.
    #[serde(default)]
    pub names: Vec<String>,
    /// Directory prefix for role-derived avatar paths.
    #[serde(default = "default_avatar_dir")]
    pub avatar_dir: String,
    /// Truncation length for display names.
    #[serde(default = "default_name_max_length")]
    pub name_max_length: usize,
}

fn default_avatar_dir() -> String {
    DEFAULT_AVATAR_DIR.to_string()
}

fn default_name_max_length() -> usize {
    DEFAULT_NAME_MAX_LENGTH
}

impl Default for PlayersConfig {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            avatar_dir: default_avatar_dir(),
            name_max_length: default_name_max_length(),
        }
    }
}

impl Config {
    /// Get the config file path (`~/.config/wolflog/config.toml`).
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the config directory path (`~/.config/wolflog`).
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(".config").join("wolflog"))
    }

    /// Load configuration from file, or return defaults if not found.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Save configuration to file, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.clone(),
                source,
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents).map_err(|source| ConfigError::Write { path, source })
    }

    /// Build per-call parse options, with `names` overriding the configured
    /// default name list when given.
    pub fn parse_options(&self, names: Option<Vec<String>>) -> ParseOptions {
        let names = names.or_else(|| {
            if self.players.names.is_empty() {
                None
            } else {
                Some(self.players.names.clone())
            }
        });
        ParseOptions {
            names,
            avatar_dir: self.players.avatar_dir.clone(),
            name_max_length: self.players.name_max_length,
        }
    }
}
