//! Builders for manifests and update configuration

use dhcli_core::types::{ChannelConfig, NetworkConfig, RetryPolicy, RetryStrategy};
use dhcli_core::Platform;
use dhcli_update::{HttpFetcher, UpdateConfig};
use serde_json::json;
use sha2::{Digest, Sha512};
use std::path::Path;

use super::constants::*;

/// Lowercase hex SHA-512, computed independently of the crate under test
pub fn sha512_of(bytes: &[u8]) -> String {
    hex::encode(Sha512::digest(bytes))
}

/// Builder for `packing_slip.json` payloads
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    version: String,
    files: serde_json::Map<String, serde_json::Value>,
}

impl ManifestBuilder {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            files: serde_json::Map::new(),
        }
    }

    /// Add an entry describing `bytes` exactly
    pub fn artifact(self, path: &str, bytes: &[u8]) -> Self {
        self.entry(path, bytes.len() as u64, &sha512_of(bytes))
    }

    /// Add an entry with an arbitrary size and digest
    pub fn entry(mut self, path: &str, size: u64, digest: &str) -> Self {
        self.files
            .insert(path.to_string(), json!({ "size": size, "sha2_512": digest }));
        self
    }

    pub fn build(&self) -> String {
        json!({ "version": self.version, "files": self.files }).to_string()
    }
}

/// Retry policy with millisecond delays so failure tests stay fast
pub fn fast_retry_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        strategy: RetryStrategy::FixedDelay,
        backoff_multiplier: 1.0,
        initial_delay_ms: 5,
        max_delay_ms: 20,
    }
}

pub fn test_network_config() -> NetworkConfig {
    NetworkConfig {
        http_timeout_secs: 10,
        connect_timeout_secs: 5,
        user_agent: TEST_USER_AGENT.to_string(),
        log_retries: false,
        show_progress: false,
    }
}

pub fn test_fetcher(max_attempts: u32) -> HttpFetcher {
    HttpFetcher::new(&test_network_config(), fast_retry_policy(max_attempts))
        .unwrap()
        .with_jitter(false)
}

pub fn channels_for(server_uri: &str) -> ChannelConfig {
    ChannelConfig {
        production_base_url: format!("{}{}/", server_uri, PRODUCTION_PREFIX),
        staging_base_url: format!("{}{}/", server_uri, STAGING_PREFIX),
        manifest_name: MANIFEST_NAME.to_string(),
    }
}

/// Update configuration targeting a mock server and a temp executable
pub fn update_config(server_uri: &str, platform: Platform, executable: &Path) -> UpdateConfig {
    UpdateConfig::new(channels_for(server_uri), CURRENT_VERSION)
        .with_platform(platform)
        .with_executable_path(executable)
}

pub fn linux_amd64() -> Platform {
    Platform::new(LINUX_OS, AMD64)
}

pub fn windows_amd64() -> Platform {
    Platform::new(WINDOWS_OS, AMD64)
}
