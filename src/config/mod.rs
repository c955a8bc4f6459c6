//! Configuration
//!
//! Typed process configuration loaded from a JSON5 file: the transport
//! auth token, the two channel identifiers, and poll behavior settings.
//! The core only ever compares channel identifiers for equality; resolving
//! them to real chat-platform channels is a transport concern.

use crate::poll::SessionSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Transport auth token (redacted when printed).
    pub auth_token: String,

    /// Channel start/close commands must come from.
    pub control_channel: String,

    /// Channel polls are presented on and votes arrive from.
    pub display_channel: String,

    /// Command prefix, e.g. `$` for `$start`.
    #[serde(default = "default_prefix")]
    pub command_prefix: String,

    /// Directory result artifacts are written into.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Poll parsing and shuffling behavior.
    #[serde(default)]
    pub poll: SessionSettings,
}

fn default_prefix() -> String {
    "$".to_string()
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "QUORUM_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "quorum.json5";

/// Resolve the config path: explicit flag, then env var, then cwd default.
pub fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load and validate configuration from a JSON5 file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = json5::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject configurations that cannot drive the dispatcher.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_channel.is_empty() {
            return Err(ConfigError::Invalid(
                "controlChannel must not be empty".to_string(),
            ));
        }
        if self.display_channel.is_empty() {
            return Err(ConfigError::Invalid(
                "displayChannel must not be empty".to_string(),
            ));
        }
        if self.command_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "commandPrefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy with the auth token redacted, for `config show`.
    pub fn redacted(&self) -> Config {
        let mut shown = self.clone();
        if !shown.auth_token.is_empty() {
            shown.auth_token = "***".to_string();
        }
        shown
    }
}
