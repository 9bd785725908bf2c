//! Version information for the dhcli CLI

use serde::{Deserialize, Serialize};

/// Identifier the update flow compares against the manifest version
///
/// The build commit when one was recorded, the package version otherwise.
pub fn current_version() -> &'static str {
    option_env!("GIT_SHA").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Package version
    pub version: String,

    /// Git commit the binary was built from
    pub commit: Option<String>,

    /// Build date
    pub build_date: Option<String>,

    /// Target triple
    pub target: Option<String>,

    /// Compiler that produced the binary
    pub rustc: Option<String>,
}

impl VersionInfo {
    /// Create version info for current build
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            build_date: option_env!("BUILD_DATE").map(String::from),
            target: option_env!("TARGET").map(String::from),
            rustc: option_env!("RUSTC_VERSION").map(String::from),
        }
    }

    /// Format as display string
    pub fn display(&self) -> String {
        let mut parts = vec![format!("dhcli {}", self.version)];

        if let Some(commit) = &self.commit {
            parts.push(format!("({})", commit));
        }

        if let Some(target) = &self.target {
            parts.push(target.clone());
        }

        parts.join(" ")
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
