//! Shared constants for test infrastructure

pub const CURRENT_VERSION: &str = "abc123";
pub const NEW_VERSION: &str = "def456";

pub const BINARY_NAME: &str = "dhcli";
pub const TEST_USER_AGENT: &str = "dhcli-cli linux";

pub const LINUX_OS: &str = "linux";
pub const WINDOWS_OS: &str = "windows";
pub const DARWIN_OS: &str = "darwin";
pub const AMD64: &str = "amd64";
pub const ARM64: &str = "arm64";

pub const LINUX_AMD64_PATH: &str = "linux/amd64/dhcli";
pub const WINDOWS_AMD64_PATH: &str = "windows/amd64/dhcli.exe";
pub const DARWIN_ARM64_PATH: &str = "darwin/arm64/dhcli";

pub const PRODUCTION_PREFIX: &str = "/dhcli/production";
pub const STAGING_PREFIX: &str = "/dhcli/staging";
pub const MANIFEST_NAME: &str = "packing_slip.json";

pub const ARTIFACT_SIZE: usize = 1024;
pub const CURRENT_BINARY: &[u8] = b"#!/bin/sh\necho current dhcli\n";

/// Deterministic artifact contents of `ARTIFACT_SIZE` bytes
pub fn new_binary() -> Vec<u8> {
    (0..ARTIFACT_SIZE).map(|i| (i % 251) as u8).collect()
}
