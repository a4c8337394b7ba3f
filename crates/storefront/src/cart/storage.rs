//! Durable cart storage.
//!
//! The cart is stored as a single JSON string; backends only move that
//! string in and out.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Errors from a cart storage backend.
#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("cart storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the serialized cart lives between sessions.
pub trait CartStorage {
    /// Read the stored cart, `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `CartStorageError` if the backend cannot be read.
    fn load(&self) -> Result<Option<String>, CartStorageError>;

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns `CartStorageError` if the backend cannot be written.
    fn save(&self, contents: &str) -> Result<(), CartStorageError>;
}

/// Cart stored in a JSON file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write never leaves a truncated cart.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    path: PathBuf,
}

impl FileCartStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartStorage for FileCartStorage {
    fn load(&self) -> Result<Option<String>, CartStorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, contents: &str) -> Result<(), CartStorageError> {
        let temp = self.temp_path();
        std::fs::write(&temp, contents)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// Cart stored in memory. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `contents`.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// The last saved contents.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> Result<Option<String>, CartStorageError> {
        Ok(self.contents())
    }

    fn save(&self, contents: &str) -> Result<(), CartStorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_owned());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn test_file_storage_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileCartStorage::new(dir.path().join("cart.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = FileCartStorage::new(dir.path().join("cart.json"));
        storage.save("[1]").unwrap();
        storage.save("[2]").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("[2]"));
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn test_memory_storage_clones_share_slot() {
        let storage = MemoryCartStorage::new();
        let other = storage.clone();
        storage.save("[]").unwrap();
        assert_eq!(other.contents().as_deref(), Some("[]"));
    }
}
