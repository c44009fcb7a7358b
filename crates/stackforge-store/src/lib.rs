//! Persistence for Stackforge: stack lock records and watch rules with their data.
//!
//! Each concern is a trait (`LockStore`, `WatchStore`) with an in-memory
//! implementation for tests and single-process use, and a file-backed one under a
//! `StoreLayout` root. File writes go through a temp file, `persist()` and a
//! directory fsync; compare-and-swap sections are serialized with an exclusive
//! `fs2` lock on the store lock file, so several engine processes can share one
//! root.

pub mod layout;
pub mod locks;
pub mod watch;

pub use layout::{StoreLayout, STORE_FORMAT_VERSION};
pub use locks::{FileLockStore, LockRecord, LockStore, MemoryLockStore};
pub use watch::{FileWatchStore, MemoryWatchStore, WatchDataPoint, WatchRuleRecord, WatchStore};

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Fsync a directory so a preceding `rename()` is durable.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = File::open(dir)?;
    f.sync_all()
}

/// Replace `dest` with `content` atomically: temp file in the same directory,
/// fsync, rename, fsync the directory.
pub(crate) fn write_atomic(dir: &Path, dest: &Path, content: &[u8]) -> Result<(), StoreError> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;
    fsync_dir(dir)?;
    Ok(())
}

/// Exclusive advisory lock on a file, held until drop.
pub(crate) struct FileGuard {
    file: File,
}

impl FileGuard {
    pub(crate) fn acquire(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()
            .map_err(|e| StoreError::LockFailed(e.to_string()))?;
        Ok(Self { file })
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Record keys become file names; keep them to one safe path component.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.len() > 255 {
        return Err(StoreError::InvalidKey(format!(
            "'{key}' must be 1-255 characters"
        )));
    }
    if key.starts_with('.') || key.contains(['/', '\\', '\0']) {
        return Err(StoreError::InvalidKey(format!(
            "'{key}' must not start with '.' or contain path separators"
        )));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("integrity check failed for '{key}': expected {expected}, got {actual}")]
    IntegrityFailure {
        key: String,
        expected: String,
        actual: String,
    },
    #[error("watch rule not found: {0}")]
    WatchNotFound(String),
    #[error("watch rule '{0}' already exists")]
    WatchExists(String),
    #[error("store lock acquisition failed: {0}")]
    LockFailed(String),
    #[error("store format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("invalid record key: {0}")]
    InvalidKey(String),
}
