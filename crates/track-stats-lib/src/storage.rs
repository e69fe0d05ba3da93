//! Storage abstraction for persisting the summary between sessions.
//!
//! This module provides a single trait `StorageBackend` and two concrete
//! implementations:
//!
//! - `MemoryStorage` — an in-process map, for sessions that must not touch disk
//!   and for tests.
//! - `FileStorage` — stores a single JSON file containing a map of string keys
//!   to string values, read once on open and rewritten synchronously on every
//!   mutation.
//!
//! The trait is string-level and object-safe; `save_json_backend` /
//! `load_json_backend` layer `serde` serialization on top of it.

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Platform storage error: {0}")]
    Platform(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Simple generic storage backend trait.
///
/// Keys and values are UTF-8 strings.
pub trait StorageBackend: Send + Sync {
    /// Store a string value for a key.
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Read a string value for a key. Returns Ok(None) when key is missing.
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a key (no-op if key does not exist).
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All stored keys, in no particular order.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

pub fn save_json_backend<T: Serialize + ?Sized>(
    backend: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let s = serde_json::to_string(value).map_err(|e| StorageError::Json(e.to_string()))?;
    backend.set_string(key, &s)
}

pub fn load_json_backend<T: DeserializeOwned>(
    backend: &dyn StorageBackend,
    key: &str,
) -> StorageResult<Option<T>> {
    match backend.get_string(key)? {
        Some(s) => serde_json::from_str::<T>(&s)
            .map(Some)
            .map_err(|e| StorageError::Json(e.to_string())),
        None => Ok(None),
    }
}

type StringMap = HashMap<String, String>;

fn lock(map: &Mutex<StringMap>) -> StorageResult<MutexGuard<'_, StringMap>> {
    map.lock()
        .map_err(|e| StorageError::Platform(format!("mutex poisoned: {:?}", e)))
}

/// Volatile storage living as long as the value itself.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        lock(&self.inner)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.inner)?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        lock(&self.inner)?.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.inner)?.keys().cloned().collect())
    }
}

/// File-based storage: stores a single JSON file which is a map of key -> string value.
///
/// Implementation notes:
/// - On open, the file is read into memory (HashMap).
/// - Mutations update memory and flush the file back to disk synchronously.
#[derive(Debug)]
pub struct FileStorage {
    /// Path to the backing JSON file.
    path: PathBuf,
    /// In-memory copy of key -> value
    inner: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Determine a good default storage file path for the current user.
    /// Uses environment variables when available:
    /// - On Windows: %APPDATA%/TrackStats/storage.json
    /// - Else: $HOME/.config/track-stats/storage.json
    pub fn default_storage_path() -> PathBuf {
        if cfg!(windows)
            && let Ok(appdata) = std::env::var("APPDATA")
        {
            return Path::new(&appdata).join("TrackStats").join("storage.json");
        }

        if let Ok(home) = std::env::var("HOME") {
            return Path::new(&home)
                .join(".config")
                .join("track-stats")
                .join("storage.json");
        }

        // Fallback to current directory
        Path::new(".").join("track-stats-storage.json")
    }

    /// Open (or create) the storage file at `path`, or at the default location.
    pub fn new_with_path(path: Option<PathBuf>) -> StorageResult<Self> {
        let path = path.unwrap_or_else(Self::default_storage_path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::Io(format!("Failed to create storage parent directory: {}", e))
            })?;
        }

        let mut map: HashMap<String, String> = HashMap::new();
        if path.exists() {
            let s = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read storage file: {}", e)))?;
            if !s.trim().is_empty() {
                map = serde_json::from_str::<HashMap<String, String>>(&s).map_err(|e| {
                    StorageError::Json(format!("Failed to parse storage JSON: {}", e))
                })?;
            }
        } else {
            tracing::debug!(path = %path.display(), "creating storage file");
            fs::File::create(&path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage file: {}", e)))?;
        }

        Ok(FileStorage {
            path,
            inner: Mutex::new(map),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush_locked(&self, locked: &HashMap<String, String>) -> StorageResult<()> {
        let s = serde_json::to_string_pretty(locked)
            .map_err(|e| StorageError::Json(e.to_string()))?;
        fs::write(&self.path, s).map_err(|e| StorageError::Io(format!("write failed: {}", e)))
    }
}

impl StorageBackend for FileStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = lock(&self.inner)?;
        guard.insert(key.to_string(), value.to_string());
        self.flush_locked(&guard)
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.inner)?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = lock(&self.inner)?;
        if guard.remove(key).is_none() {
            return Ok(());
        }
        self.flush_locked(&guard)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.inner)?.keys().cloned().collect())
    }
}
