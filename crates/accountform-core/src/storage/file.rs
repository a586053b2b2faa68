//! File-backed storage.
//!
//! Each key lives in its own `<key>.json` file inside a directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::StorageBackend;
use crate::{Error, Result};

/// Storage writing one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir`.
    ///
    /// The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the key files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` could escape the directory.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\', '\0'])
        {
            return Err(Error::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                debug!("Read {} bytes from {}", contents.len(), path.display());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Write next to the target and rename so readers never see a torn file.
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, value)?;
        std::fs::rename(&tmp_path, &path)?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get("accounts").unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.set("accounts", "[]").unwrap();
        assert_eq!(storage.get("accounts").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("accounts.json").exists());
        assert!(!dir.path().join("accounts.json.tmp").exists());
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("deeper");
        let mut storage = FileStorage::new(&nested);
        storage.set("accounts", "[]").unwrap();
        assert!(nested.join("accounts.json").exists());
    }

    #[test]
    fn rejects_escaping_keys() {
        let storage = FileStorage::new("/tmp/unused");
        for key in ["", ".", "..", "../x", "a/b", "a\\b"] {
            assert!(
                matches!(storage.path_for(key), Err(Error::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn unreadable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the key file should be cannot be read as a string.
        std::fs::create_dir(dir.path().join("accounts.json")).unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(storage.get("accounts"), Err(Error::Io(_))));
    }
}
