//! Error types for the update flow

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UpdateError>;

/// Coarse classification of an [`UpdateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    ManifestParse,
    NoApplicableBuild,
    Integrity,
    Filesystem,
}

/// A downloaded artifact that does not match its manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("file size mismatch; expected {expected}, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("SHA512 mismatch; expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
}

/// The installer step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    ResolveExecutable,
    ReadPermissions,
    CreateTempDir,
    WriteBinary,
    SetPermissions,
    MoveAside,
    MoveIntoPlace,
    RemoveBackup,
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            InstallStep::ResolveExecutable => "resolve the current executable",
            InstallStep::ReadPermissions => "read executable permissions",
            InstallStep::CreateTempDir => "create temporary directory",
            InstallStep::WriteBinary => "write new binary",
            InstallStep::SetPermissions => "set permissions on new binary",
            InstallStep::MoveAside => "move current executable aside",
            InstallStep::MoveIntoPlace => "move new binary into place",
            InstallStep::RemoveBackup => "remove previous version",
        };
        f.write_str(step)
    }
}

/// What happened when restoring the backup after a failed final rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// The previous executable is back at its original path
    Restored,

    /// The previous executable is still at the backup path
    Failed {
        cause: String,
        restore_command: String,
    },
}

/// Errors produced by the update flow
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A request failed after retries, or with a permanent status
    #[error("failed to fetch {url}: {cause}")]
    Network {
        url: String,
        status: Option<u16>,
        cause: String,
    },

    /// The HTTP client could not be constructed
    #[error("failed to initialise HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The manifest payload is not a valid manifest document
    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// The manifest has no entry for this platform
    #[error("path not found in manifest: {path}")]
    NoApplicableBuild { path: String },

    /// The downloaded artifact failed verification
    #[error("artifact verification failed: {0}")]
    Integrity(#[from] IntegrityError),

    /// An installer step failed while the original executable was intact
    #[error("failed to {step} ({}): {source}", .path.display())]
    Filesystem {
        step: InstallStep,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The new binary could not be moved into place after the original was moved aside
    #[error("{}", incomplete_message(.executable, .backup, .source, .rollback))]
    Incomplete {
        executable: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
        rollback: RollbackOutcome,
    },
}

impl UpdateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpdateError::Network { .. } | UpdateError::HttpClient(_) => ErrorKind::Network,
            UpdateError::ManifestParse(_) => ErrorKind::ManifestParse,
            UpdateError::NoApplicableBuild { .. } => ErrorKind::NoApplicableBuild,
            UpdateError::Integrity(_) => ErrorKind::Integrity,
            UpdateError::Filesystem { .. } | UpdateError::Incomplete { .. } => {
                ErrorKind::Filesystem
            }
        }
    }

    /// HTTP status of a failed request, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            UpdateError::Network { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn filesystem(step: InstallStep, path: impl Into<PathBuf>, source: io::Error) -> Self {
        UpdateError::Filesystem {
            step,
            path: path.into(),
            source,
        }
    }
}

fn incomplete_message(
    executable: &Path,
    backup: &Path,
    source: &io::Error,
    rollback: &RollbackOutcome,
) -> String {
    let head = format!(
        "failed to {} ({}): {}",
        InstallStep::MoveIntoPlace,
        executable.display(),
        source
    );
    match rollback {
        RollbackOutcome::Restored => {
            format!("{head}; the previous version was restored")
        }
        RollbackOutcome::Failed {
            cause,
            restore_command,
        } => format!(
            "{head}; restoring the previous version from {} also failed: {cause}\n\
             Restore it manually with:\n  {restore_command}",
            backup.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_messages_carry_expected_and_actual() {
        let err = UpdateError::from(IntegrityError::SizeMismatch {
            expected: 1024,
            actual: 1020,
        });
        assert_eq!(err.kind(), ErrorKind::Integrity);
        assert!(err
            .to_string()
            .contains("file size mismatch; expected 1024, got 1020"));

        let err = IntegrityError::DigestMismatch {
            expected: "aa".into(),
            actual: "bb".into(),
        };
        assert_eq!(err.to_string(), "SHA512 mismatch; expected aa, got bb");
    }

    #[test]
    fn test_filesystem_error_names_step() {
        let err = UpdateError::filesystem(
            InstallStep::MoveAside,
            "/usr/local/bin/dhcli",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert_eq!(
            err.to_string(),
            "failed to move current executable aside (/usr/local/bin/dhcli): denied"
        );
    }

    #[test]
    fn test_incomplete_error_includes_restore_command() {
        let err = UpdateError::Incomplete {
            executable: PathBuf::from("/opt/dhcli"),
            backup: PathBuf::from("/opt/dhcli.old"),
            source: io::Error::other("disk full"),
            rollback: RollbackOutcome::Failed {
                cause: "busy".into(),
                restore_command: "mv \"/opt/dhcli.old\" \"/opt/dhcli\"".into(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("move new binary into place"));
        assert!(message.contains("mv \"/opt/dhcli.old\" \"/opt/dhcli\""));

        let restored = UpdateError::Incomplete {
            executable: PathBuf::from("/opt/dhcli"),
            backup: PathBuf::from("/opt/dhcli.old"),
            source: io::Error::other("disk full"),
            rollback: RollbackOutcome::Restored,
        };
        assert!(restored.to_string().ends_with("the previous version was restored"));
    }

    #[test]
    fn test_network_status() {
        let err = UpdateError::Network {
            url: "https://example.test/packing_slip.json".into(),
            status: Some(404),
            cause: "HTTP 404 Not Found".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.status(), Some(404));
    }
}
