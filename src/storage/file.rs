use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::backend::{StorageBackend, StorageError};

/// File-backed storage: one file per key under a root directory.
///
/// This is the platform analogue of browser local storage: records
/// survive process restarts. The root directory is created lazily on the
/// first write, so constructing a backend never touches the filesystem.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a backend rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Backend rooted at the per-user data directory, `~/.local/repersist`,
    /// falling back to the system temp directory when no home directory
    /// resolves.
    pub fn platform_default() -> Self {
        let root = home::home_dir()
            .map(|home| home.join(".local").join("repersist"))
            .unwrap_or_else(|| std::env::temp_dir().join("repersist"));
        Self::new(root)
    }

    /// Root directory of this backend.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // Keys map to file names; anything outside [A-Za-z0-9_-] is replaced
    // so a key can never escape the root.
    fn record_path(&self, key: &str) -> PathBuf {
        let mut name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if name.is_empty() {
            name.push('_');
        }
        self.root.join(name)
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.record_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.record_path(key), value)?;
        Ok(())
    }
}
