//! Local key-value persistence for chat history
//!
//! The browser widget keeps its history in local storage under a single key.
//! This module provides the same contract for native hosts: a file-backed
//! store for real sessions and an in-memory one for tests and throwaway
//! sessions.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Key under which the serialized history is stored
pub const HISTORY_KEY: &str = "chat_history";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value storage for serialized history
pub trait HistoryStorage: Send + Sync {
    /// Read the value under `key`, `None` if nothing is stored
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value under `key`
    fn save(&self, key: &str, payload: &str) -> StorageResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: HistoryStorage + ?Sized> HistoryStorage for Arc<T> {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
        (**self).save(key, payload)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// ============================================================================
// File storage
// ============================================================================

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write to a temp file in the same directory, fsync, then rename into place
///
/// The temp file is removed again if any step after its creation fails.
fn atomic_write(path: &Path, content: &str) -> StorageResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(io_error(parent))?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("history.json");
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

    let mut temp_file = std::fs::File::create(&temp_path).map_err(io_error(&temp_path))?;
    let result = temp_file
        .write_all(content.as_bytes())
        .and_then(|()| temp_file.sync_all())
        .map_err(io_error(&temp_path))
        .and_then(|()| std::fs::rename(&temp_path, path).map_err(io_error(path)));
    drop(temp_file);

    if result.is_err() {
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::warn!(path = %temp_path.display(), error = %e, "Failed to remove temp file");
        }
    }
    result
}

impl HistoryStorage for FileStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, payload)?;
        tracing::debug!(path = %path.display(), bytes = payload.len(), "Saved history");
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

// ============================================================================
// Memory storage
// ============================================================================

/// Process-local storage, lost when the session ends
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStorage for MemoryStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
