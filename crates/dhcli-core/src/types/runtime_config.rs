//! Runtime configuration types for the update flow
//!
//! These types define the release channel endpoints, HTTP behaviour, and the
//! retry policy the fetcher applies to transient network failures.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::error::{Error, Result};
use crate::BINARY_NAME;

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Release channel endpoints
    #[serde(default)]
    pub channels: ChannelConfig,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Retry policy for fetches
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl RuntimeConfig {
    /// Check values and normalise the channel base URLs
    pub fn validate(&mut self) -> Result<()> {
        self.channels.normalize()?;

        if self.network.http_timeout_secs == 0 {
            return Err(Error::invalid_config(
                "network.http-timeout-secs must be greater than zero",
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::invalid_config(
                "retry.max-attempts must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Release track to update from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    /// Production builds (default)
    #[default]
    Production,

    /// Staging builds
    Staging,
}

impl Channel {
    /// Select the channel from a `--staging` style flag
    pub fn from_staging(staging: bool) -> Self {
        if staging {
            Channel::Staging
        } else {
            Channel::Production
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Production => write!(f, "production"),
            Channel::Staging => write!(f, "staging"),
        }
    }
}

/// Release channel endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChannelConfig {
    /// Base URL of production artifacts
    #[serde(default = "default_production_base_url")]
    pub production_base_url: String,

    /// Base URL of staging artifacts
    #[serde(default = "default_staging_base_url")]
    pub staging_base_url: String,

    /// Manifest file name under each base URL
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            production_base_url: default_production_base_url(),
            staging_base_url: default_staging_base_url(),
            manifest_name: default_manifest_name(),
        }
    }
}

const ARTIFACTS_BASE_URL: &str = "https://artifactory/dhcli/";

fn default_production_base_url() -> String {
    format!("{}production/", ARTIFACTS_BASE_URL)
}
fn default_staging_base_url() -> String {
    format!("{}staging/", ARTIFACTS_BASE_URL)
}
fn default_manifest_name() -> String {
    "packing_slip.json".to_string()
}

impl ChannelConfig {
    /// Base URL for a channel, always ending in `/`
    pub fn base_url(&self, channel: Channel) -> &str {
        match channel {
            Channel::Production => &self.production_base_url,
            Channel::Staging => &self.staging_base_url,
        }
    }

    /// Validate both base URLs and make sure they end in `/`
    pub fn normalize(&mut self) -> Result<()> {
        self.production_base_url = normalize_base_url(&self.production_base_url)?;
        self.staging_base_url = normalize_base_url(&self.staging_base_url)?;

        if self.manifest_name.trim().is_empty() {
            return Err(Error::invalid_config(
                "channels.manifest-name must not be empty",
            ));
        }

        Ok(())
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| Error::invalid_url(trimmed, e))?;

    if url.cannot_be_a_base() {
        return Err(Error::invalid_config(format!(
            "'{}' cannot be used as a base URL",
            trimmed
        )));
    }

    let mut normalized = url.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}

/// Network and HTTP configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Log each failed attempt and retry wait
    #[serde(default)]
    pub log_retries: bool,

    /// Show a progress bar while downloading
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
            log_retries: false,
            show_progress: default_show_progress(),
        }
    }
}

fn default_http_timeout() -> u64 {
    300 // 5 minutes
}
fn default_connect_timeout() -> u64 {
    30
}
fn default_show_progress() -> bool {
    true
}

/// `<binary>-cli <os>`, the identifying header the artifact server expects
pub fn default_user_agent() -> String {
    format!("{}-cli {}", BINARY_NAME, super::Platform::current().os)
}

/// Retry policy for an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Retry strategy
    #[serde(default)]
    pub strategy: RetryStrategy,

    /// Backoff multiplier for exponential strategies
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            strategy: RetryStrategy::default(),
            backoff_multiplier: default_backoff_multiplier(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    10
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_initial_delay() -> u64 {
    1000
}
fn default_max_delay() -> u64 {
    30000
}

/// Retry strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetryStrategy {
    /// No wait between attempts
    None,

    /// Fixed delay between retries
    FixedDelay,

    /// Exponential backoff (default)
    #[default]
    ExponentialBackoff,

    /// Linear backoff
    LinearBackoff,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(
            config.channels.base_url(Channel::Production),
            "https://artifactory/dhcli/production/"
        );
        assert_eq!(
            config.channels.base_url(Channel::Staging),
            "https://artifactory/dhcli/staging/"
        );
        assert_eq!(config.channels.manifest_name, "packing_slip.json");
        assert_eq!(config.retry.max_attempts, 10);
        assert_eq!(config.retry.initial_delay_ms, 1000);
        assert_eq!(config.retry.strategy, RetryStrategy::ExponentialBackoff);
        assert!(!config.network.log_retries);
    }

    #[test]
    fn test_default_user_agent() {
        let agent = default_user_agent();
        assert!(agent.starts_with("dhcli-cli "));
        assert!(agent.ends_with(&crate::Platform::current().os));
    }

    #[test]
    fn test_channel_from_staging() {
        assert_eq!(Channel::from_staging(true), Channel::Staging);
        assert_eq!(Channel::from_staging(false), Channel::Production);
        assert_eq!(Channel::Staging.to_string(), "staging");
    }

    #[test]
    fn test_normalize_adds_trailing_slash() {
        let mut channels = ChannelConfig {
            production_base_url: "http://127.0.0.1:8080/prod".to_string(),
            staging_base_url: " https://example.com/dhcli/staging/ ".to_string(),
            manifest_name: "packing_slip.json".to_string(),
        };
        channels.normalize().unwrap();

        assert_eq!(channels.production_base_url, "http://127.0.0.1:8080/prod/");
        assert_eq!(
            channels.staging_base_url,
            "https://example.com/dhcli/staging/"
        );
    }

    #[test]
    fn test_normalize_rejects_invalid_url() {
        let mut channels = ChannelConfig {
            production_base_url: "not a url".to_string(),
            ..ChannelConfig::default()
        };
        let err = channels.normalize().unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = RuntimeConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
channels:
  staging-base-url: "http://localhost:9000/staging/"
retry:
  max-attempts: 4
"#;
        let config: RuntimeConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(
            config.channels.staging_base_url,
            "http://localhost:9000/staging/"
        );
        assert_eq!(
            config.channels.production_base_url,
            default_production_base_url()
        );
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.max_delay_ms, 30000);
        assert_eq!(config.network.http_timeout_secs, 300);
    }
}
