//! Layered runtime configuration loader
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Built-in defaults
//! 2. Runtime config file (~/.dhcli/runtime.yaml, or an explicit path)
//! 3. Environment variables (DHCLI_* prefix)
//! 4. CLI flags (handled by caller)
//!
//! The environment is consulted once, here, so the update flow itself only
//! ever sees an explicit `RuntimeConfig`.

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;
use tracing::debug;

/// Default runtime config file name inside the config directory
const RUNTIME_CONFIG_FILE: &str = "runtime.yaml";

/// Runtime configuration loader
pub struct ConfigLoader {
    /// Path of the runtime config file, if one could be determined
    config_path: Option<Utf8PathBuf>,

    /// Fail when the config file is missing
    required: bool,
}

impl ConfigLoader {
    /// Create a loader reading the standard config file (~/.dhcli/runtime.yaml)
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            required: false,
        }
    }

    /// Create a loader for an explicit config file, which must exist
    pub fn with_path(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            required: true,
        }
    }

    /// Create a loader that only applies defaults and environment overrides
    pub fn defaults_only() -> Self {
        Self {
            config_path: None,
            required: false,
        }
    }

    /// Get the standard config file path
    fn default_config_path() -> Option<Utf8PathBuf> {
        let home = dirs::home_dir()?;
        let home = Utf8PathBuf::from_path_buf(home).ok()?;
        Some(home.join(".dhcli").join(RUNTIME_CONFIG_FILE))
    }

    /// Load runtime configuration with layered precedence
    pub fn load(&self) -> Result<RuntimeConfig> {
        let mut config = match &self.config_path {
            Some(path) if path.exists() => {
                debug!("Loading runtime config from {}", path);
                self.load_yaml_file(path)?
            }
            Some(path) if self.required => {
                return Err(Error::config_not_found(path.as_str()));
            }
            _ => RuntimeConfig::default(),
        };

        config = self.apply_env_overrides(config)?;
        config.validate()?;

        Ok(config)
    }

    /// Load a YAML file and parse it
    fn load_yaml_file(&self, path: &Utf8Path) -> Result<RuntimeConfig> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(RuntimeConfig::default());
        }
        let config: RuntimeConfig =
            serde_yaml_ng::from_str(&content).map_err(|source| Error::YamlParse {
                path: path.to_string(),
                source,
            })?;
        Ok(config)
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("DHCLI_PRODUCTION_BASE_URL") {
            config.channels.production_base_url = val;
        }

        if let Ok(val) = env::var("DHCLI_STAGING_BASE_URL") {
            config.channels.staging_base_url = val;
        }

        if let Ok(val) = env::var("DHCLI_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("DHCLI_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("DHCLI_MAX_ATTEMPTS") {
            config.retry.max_attempts = val
                .parse()
                .map_err(|_| Error::invalid_config("DHCLI_MAX_ATTEMPTS must be a valid number"))?;
        }

        if let Ok(val) = env::var("DHCLI_LOG_RETRIES") {
            config.network.log_retries = parse_flag("DHCLI_LOG_RETRIES", &val)?;
        }

        if let Ok(val) = env::var("DHCLI_NO_PROGRESS") {
            config.network.show_progress = !parse_flag("DHCLI_NO_PROGRESS", &val)?;
        }

        Ok(config)
    }

    /// Get the config file path
    pub fn config_path(&self) -> Option<&Utf8Path> {
        self.config_path.as_deref()
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::invalid_config(format!(
            "{} must be true or false, got '{}'",
            name, value
        ))),
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
