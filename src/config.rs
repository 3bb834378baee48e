use crate::error::{ConfigErrorKind, InfraError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "plugins/StackLimit/config.yml";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Process-level settings for the console host. The limits themselves live in
/// the plugin's YAML config (see [`crate::store`]).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_config_path")]
    pub config_path: PathBuf, // e.g. "plugins/StackLimit/config.yml"
    #[serde(default = "default_log_filter")]
    pub log_filter: String, // e.g. "stacklimit=debug"
}

fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InfraError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| InfraError::config(path, ConfigErrorKind::Read(e)))?;
        Self::from_toml_str(&data).map_err(|e| InfraError::config(path, e))
    }

    pub fn from_toml_str(data: &str) -> Result<Self, ConfigErrorKind> {
        toml::from_str(data).map_err(ConfigErrorKind::Settings)
    }

    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env");
        Self {
            config_path: std::env::var("STACKLIMIT_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_config_path()),
            log_filter: std::env::var("STACKLIMIT_LOG").unwrap_or_else(|_| default_log_filter()),
        }
    }
}
