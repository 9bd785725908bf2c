//! In-place replacement of the running executable
//!
//! The new binary is staged in a temporary directory next to the
//! executable so every move is a same-filesystem rename:
//!
//! 1. resolve the executable path (symlinks followed)
//! 2. record its permission bits
//! 3. create `dhcli-cli-update*` beside it (removed when `install` returns)
//! 4. write the new binary there with the recorded permissions
//! 5. discard a leftover `<exe>.old`
//! 6. rename `<exe>` to `<exe>.old`
//! 7. rename the staged binary to `<exe>`
//! 8. remove `<exe>.old`, or keep it where a running executable cannot be deleted
//!
//! Until step 6 the original is untouched. If step 7 fails the backup is
//! renamed back once; when that also fails the error carries the command
//! that restores it by hand.

use dhcli_core::Platform;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::{InstallStep, Result, RollbackOutcome, UpdateError};

/// Prefix of the staging directory created beside the executable
pub const TEMP_DIR_PREFIX: &str = "dhcli-cli-update";

/// Suffix appended to the executable path for the backup
pub const BACKUP_SUFFIX: &str = ".old";

/// Filesystem operations that move or delete the live executable
pub trait FileOps: Send + Sync {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// [`FileOps`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Result of a completed installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Path now holding the new binary
    pub executable: PathBuf,

    /// Backup left behind for the user to delete
    pub retained_backup: Option<PathBuf>,
}

/// Replaces an executable with verified bytes
#[derive(Debug, Clone)]
pub struct Installer<F = StdFileOps> {
    platform: Platform,
    binary_name: String,
    file_ops: F,
}

impl Installer<StdFileOps> {
    pub fn new(platform: Platform, binary_name: impl Into<String>) -> Self {
        Self {
            platform,
            binary_name: binary_name.into(),
            file_ops: StdFileOps,
        }
    }
}

impl<F: FileOps> Installer<F> {
    /// Replace the filesystem seam
    pub fn with_file_ops<G: FileOps>(self, file_ops: G) -> Installer<G> {
        Installer {
            platform: self.platform,
            binary_name: self.binary_name,
            file_ops,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Install `bytes` in place of `executable`
    pub fn install(&self, bytes: &[u8], executable: &Path) -> Result<InstallReport> {
        let executable = fs::canonicalize(executable)
            .map_err(|e| UpdateError::filesystem(InstallStep::ResolveExecutable, executable, e))?;
        let dir = executable.parent().ok_or_else(|| {
            UpdateError::filesystem(
                InstallStep::ResolveExecutable,
                &executable,
                io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory"),
            )
        })?;

        let permissions = fs::metadata(&executable)
            .map_err(|e| UpdateError::filesystem(InstallStep::ReadPermissions, &executable, e))?
            .permissions();

        let staging = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(dir)
            .map_err(|e| UpdateError::filesystem(InstallStep::CreateTempDir, dir, e))?;

        let staged = staging
            .path()
            .join(self.platform.executable_name(&self.binary_name));
        fs::write(&staged, bytes)
            .map_err(|e| UpdateError::filesystem(InstallStep::WriteBinary, &staged, e))?;
        fs::set_permissions(&staged, permissions)
            .map_err(|e| UpdateError::filesystem(InstallStep::SetPermissions, &staged, e))?;
        debug!(path = %staged.display(), bytes = bytes.len(), "staged new binary");

        let backup = backup_path(&executable);
        match self.file_ops.remove_file(&backup) {
            Ok(()) => debug!(path = %backup.display(), "removed leftover backup"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %backup.display(), error = %e, "could not remove leftover backup"),
        }

        self.file_ops
            .rename(&executable, &backup)
            .map_err(|e| UpdateError::filesystem(InstallStep::MoveAside, &executable, e))?;

        if let Err(source) = self.file_ops.rename(&staged, &executable) {
            error!(
                executable = %executable.display(),
                error = %source,
                "failed to move new binary into place, restoring previous version"
            );
            let rollback = self.roll_back(&backup, &executable);
            return Err(UpdateError::Incomplete {
                executable,
                backup,
                source,
                rollback,
            });
        }

        if !self.platform.can_remove_running_executable() {
            debug!(backup = %backup.display(), "previous version retained");
            return Ok(InstallReport {
                executable,
                retained_backup: Some(backup),
            });
        }

        self.file_ops
            .remove_file(&backup)
            .map_err(|e| UpdateError::filesystem(InstallStep::RemoveBackup, &backup, e))?;

        debug!(executable = %executable.display(), "binary replaced");
        Ok(InstallReport {
            executable,
            retained_backup: None,
        })
    }

    fn roll_back(&self, backup: &Path, executable: &Path) -> RollbackOutcome {
        match self.file_ops.rename(backup, executable) {
            Ok(()) => {
                info!(executable = %executable.display(), "previous version restored");
                RollbackOutcome::Restored
            }
            Err(e) => {
                error!(backup = %backup.display(), error = %e, "rollback failed");
                RollbackOutcome::Failed {
                    cause: e.to_string(),
                    restore_command: restore_command(&self.platform, backup, executable),
                }
            }
        }
    }
}

/// `<executable>.old`
pub fn backup_path(executable: &Path) -> PathBuf {
    let mut path = OsString::from(executable.as_os_str());
    path.push(BACKUP_SUFFIX);
    PathBuf::from(path)
}

/// Path of the running executable
pub fn current_executable() -> Result<PathBuf> {
    std::env::current_exe()
        .map_err(|e| UpdateError::filesystem(InstallStep::ResolveExecutable, PathBuf::new(), e))
}

fn restore_command(platform: &Platform, backup: &Path, executable: &Path) -> String {
    let verb = if platform.is_windows() { "move /Y" } else { "mv" };
    format!(
        "{} \"{}\" \"{}\"",
        verb,
        backup.display(),
        executable.display()
    )
}
