//! # Document Store
//!
//! The persistence bridge: a narrow key-value interface the session writes
//! the whole estimate through after every change, and reads once at start.
//!
//! - [`FileStore`] keeps one `<key>.json` file per key in a directory, with
//!   atomic writes under an exclusive lock.
//! - [`MemoryStore`] keeps entries in memory; it can be told to fail writes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{EstimateError, EstimateResult};
use crate::file_io::{write_atomic, FileLock};

/// Key the estimate is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "xmas-estimator-v4";

/// Whole-value key-value storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> EstimateResult<Option<String>>;

    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> EstimateResult<()>;
}

/// Keys become file names, so keep them to a safe alphabet.
pub fn validate_key(key: &str) -> EstimateResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(EstimateError::invalid_input(
            "storage_key",
            key,
            "Keys may only contain letters, digits, '-', '_' and '.', and must not start with '.'",
        ))
    }
}

/// Directory-backed store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> EstimateResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> EstimateResult<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| EstimateError::file_error("read", path.display().to_string(), e.to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> EstimateResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| {
            EstimateError::file_error("create directory", self.dir.display().to_string(), e.to_string())
        })?;

        let _lock = FileLock::acquire(&path)?;
        write_atomic(&path, value)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut store = MemoryStore::new();
        store.entries.insert(key.into(), value.into());
        store
    }

    /// Make every subsequent `set` fail, as a full or read-only disk would.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> EstimateResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> EstimateResult<()> {
        if self.fail_writes {
            return Err(EstimateError::file_error("write", key, "storage quota exceeded"));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
