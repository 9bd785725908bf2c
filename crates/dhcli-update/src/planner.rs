//! Decide whether an update is needed and which artifact applies

use dhcli_core::Platform;
use tracing::debug;

use crate::error::{Result, UpdateError};
use crate::manifest::{ArtifactDescriptor, Manifest};

/// Result of planning an update against a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan<'a> {
    /// The running version is the published version
    UpToDate,

    /// The artifact at `path` should replace the running binary
    Update {
        path: String,
        descriptor: &'a ArtifactDescriptor,
    },
}

/// Compare versions and resolve this platform's manifest entry
///
/// Versions are opaque: equal strings mean up to date, anything else
/// means update, with no ordering.
pub fn plan<'a>(
    current_version: &str,
    manifest: &'a Manifest,
    platform: &Platform,
    binary_name: &str,
) -> Result<Plan<'a>> {
    if current_version == manifest.version {
        return Ok(Plan::UpToDate);
    }

    let path = platform.artifact_path(binary_name);
    debug!(path = %path, "resolving manifest entry");

    match manifest.get(&path) {
        Some(descriptor) => Ok(Plan::Update { path, descriptor }),
        None => Err(UpdateError::NoApplicableBuild { path }),
    }
}
