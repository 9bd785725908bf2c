//! Release platform identification
//!
//! The release system publishes one artifact per `<os>/<arch>` pair using
//! Go-style names (`linux/amd64`, `darwin/arm64`, `windows/amd64`). This
//! module maps the Rust target constants onto that naming and carries the
//! host capabilities the installer depends on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system name the release system uses for Windows builds
pub const WINDOWS: &str = "windows";

/// An `<os>/<arch>` pair in release naming
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system (linux, darwin, windows, ...)
    pub os: String,

    /// CPU architecture (amd64, arm64, 386, ...)
    pub arch: String,
}

impl Platform {
    /// Create a platform from release-style names
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this binary was compiled for
    pub fn current() -> Self {
        Self::from_rust_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust `target_os`/`target_arch` names onto release naming
    pub fn from_rust_target(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };

        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "powerpc64" => "ppc64",
            "loongarch64" => "loong64",
            other => other,
        };

        Self::new(os, arch)
    }

    /// Whether this is the Windows platform
    pub fn is_windows(&self) -> bool {
        self.os.eq_ignore_ascii_case(WINDOWS)
    }

    /// File name of `binary_name` on this platform (`.exe` on Windows)
    pub fn executable_name(&self, binary_name: &str) -> String {
        if self.is_windows() {
            format!("{}.exe", binary_name)
        } else {
            binary_name.to_string()
        }
    }

    /// Relative artifact path published for this platform
    ///
    /// ```rust
    /// use dhcli_core::Platform;
    ///
    /// let platform = Platform::new("windows", "amd64");
    /// assert_eq!(platform.artifact_path("dhcli"), "windows/amd64/dhcli.exe");
    /// ```
    pub fn artifact_path(&self, binary_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.os,
            self.arch,
            self.executable_name(binary_name)
        )
    }

    /// Whether the file of a running executable may be deleted
    ///
    /// Windows keeps the image of a running process locked, so a binary that
    /// has been renamed aside can only be removed after the process exits.
    pub fn can_remove_running_executable(&self) -> bool {
        !self.is_windows()
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
