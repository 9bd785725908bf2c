//! Temporary executable helpers

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use super::constants::*;

/// A fake installed executable inside its own temp directory
pub struct InstalledBinary {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl InstalledBinary {
    pub fn new() -> Self {
        Self::named(BINARY_NAME)
    }

    pub fn named(name: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, CURRENT_BINARY).unwrap();
        let path = fs::canonicalize(path).unwrap();
        Self { dir, path }
    }

    pub fn contents(&self) -> Vec<u8> {
        fs::read(&self.path).unwrap()
    }

    pub fn backup(&self) -> PathBuf {
        dhcli_update::installer::backup_path(&self.path)
    }

    /// Names of everything left in the executable's directory
    pub fn siblings(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn assert_unchanged(binary: &InstalledBinary) {
    assert_eq!(
        binary.contents(),
        CURRENT_BINARY,
        "executable at {} was modified",
        binary.path.display()
    );
}
