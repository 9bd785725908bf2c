//! Release manifest (`packing_slip.json`) model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

/// A published release: its version and one descriptor per artifact path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Opaque release identifier, compared for equality only
    pub version: String,

    /// Artifact path (`<os>/<arch>/<binary>[.exe]`) to descriptor
    pub files: BTreeMap<String, ArtifactDescriptor>,
}

/// Expected size and digest of one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// Size in bytes
    pub size: u64,

    /// Lowercase hex SHA-512 of the artifact
    #[serde(rename = "sha2_512")]
    pub digest: String,
}

impl Manifest {
    /// Parse a manifest payload
    ///
    /// Surrounding whitespace is ignored. An empty `files` object is valid.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes.trim_ascii())?)
    }

    pub fn get(&self, path: &str) -> Option<&ArtifactDescriptor> {
        self.files.get(path)
    }
}

impl fmt::Display for ArtifactDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes, sha2_512 {}", self.size, self.digest)
    }
}
