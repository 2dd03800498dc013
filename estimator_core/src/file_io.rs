//! # File I/O Module
//!
//! Handles estimate files with safety features:
//! - **Atomic writes**: write to .tmp, fsync, rename so a crash never leaves
//!   a half-written document behind
//! - **File locking**: an OS-level exclusive lock so two processes cannot
//!   interleave writes to the same store entry
//! - **Export / import**: pretty-printed JSON files named with a timestamp,
//!   and parsing of user-supplied files that never touches the current
//!   document on failure
//!
//! ## Example
//!
//! ```rust,no_run
//! use estimator_core::estimate::Estimate;
//! use estimator_core::file_io::{export_to_dir, import_from_path};
//! use std::path::Path;
//!
//! let estimate = Estimate::starter();
//! let path = export_to_dir(&estimate, Path::new("exports"))?;
//!
//! let reloaded = import_from_path(&path)?;
//! assert_eq!(reloaded, estimate);
//! # Ok::<(), estimator_core::errors::EstimateError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::Estimate;

/// Metadata written into a lock file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        LockInfo {
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Exclusive lock guard, released when dropped.
///
/// Uses OS-level file locking (via fs2) on a sibling `.lock` file that also
/// records who holds it.
pub struct FileLock {
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock for `path` without blocking.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired
    /// * `Err(EstimateError::FileLocked)` - Another process holds the lock
    pub fn acquire(path: &Path) -> EstimateResult<Self> {
        let lock_path = lock_path_for(path);

        let mut lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| EstimateError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        if lock_file.try_lock_exclusive().is_err() {
            let holder = read_lock_info(&mut lock_file)
                .map(|info| format!("pid {} since {}", info.pid, info.locked_at.to_rfc3339()))
                .unwrap_or_else(|| "another process".to_string());
            return Err(EstimateError::file_locked(path.display().to_string(), holder));
        }

        let info = LockInfo::current();
        let lock_json = serde_json::to_string(&info).map_err(|e| EstimateError::SerializationError {
            reason: e.to_string(),
        })?;

        lock_file
            .set_len(0)
            .and_then(|_| lock_file.write_all(lock_json.as_bytes()))
            .map_err(|e| EstimateError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(FileLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        // OS lock is released when _lock_file is dropped
    }
}

/// Get the lock file path for a data file
fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(file: &mut File) -> Option<LockInfo> {
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Write a file with atomic semantics.
///
/// 1. Write to a temporary sibling (.tmp)
/// 2. Sync to disk (fsync)
/// 3. Rename over the target (atomic on most filesystems)
pub fn write_atomic(path: &Path, contents: &str) -> EstimateResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        EstimateError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(contents.as_bytes()).map_err(|e| {
        EstimateError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        EstimateError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EstimateError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp_path = path.to_path_buf();
    let extension = tmp_path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp_path.set_extension(extension);
    tmp_path
}

/// File name for an export taken at `now`: `estimate_<unix-millis>.json`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("estimate_{}.json", now.timestamp_millis())
}

/// Pretty-printed JSON for an estimate.
pub fn export_json(estimate: &Estimate) -> EstimateResult<String> {
    serde_json::to_string_pretty(estimate).map_err(|e| EstimateError::SerializationError {
        reason: e.to_string(),
    })
}

/// Write an export file into `dir` (created if needed) and return its path.
pub fn export_to_dir(estimate: &Estimate, dir: &Path) -> EstimateResult<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| EstimateError::file_error("create directory", dir.display().to_string(), e.to_string()))?;

    let path = dir.join(export_file_name(Utc::now()));
    write_atomic(&path, &export_json(estimate)?)?;
    Ok(path)
}

/// Parse imported text as an estimate.
///
/// Anything that is not a JSON object of the estimate's shape is an
/// `ImportFailed` error.
pub fn parse_estimate(text: &str) -> EstimateResult<Estimate> {
    serde_json::from_str(text).map_err(|e| EstimateError::import_failed(e.to_string()))
}

/// Read and parse an import file.
pub fn import_from_path(path: &Path) -> EstimateResult<Estimate> {
    let contents = fs::read_to_string(path)
        .map_err(|e| EstimateError::file_error("read", path.display().to_string(), e.to_string()))?;
    parse_estimate(&contents)
}
