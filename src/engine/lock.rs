//! engine::lock
//!
//! Exclusive advisory lock for one asset.
//!
//! # Architecture
//!
//! The engine assumes single-writer access: two overlapping execs against
//! the same asset could interleave their temp files, diffs, and link
//! steps. The lock makes that assumption enforceable. It is scoped to the
//! asset directory (`<root>/<name>/.lock`) and held for the full
//! capture -> diff -> commit -> purge sequence.
//!
//! # Invariants
//!
//! - Lock acquisition is non-blocking (fails fast if another process or
//!   handle holds it)
//! - The lock is released on drop (RAII), including on panic
//! - The lock file itself is never deleted; only the OS lock is released

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::AssetPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another exec already holds the lock for this asset.
    #[error("asset is locked by another snapvault invocation")]
    AlreadyLocked,

    /// Failed to create the lock file or its directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on one asset's directory.
///
/// Released when dropped.
#[derive(Debug)]
pub struct AssetLock {
    path: PathBuf,
    // Some while the lock is held.
    file: Option<File>,
}

impl AssetLock {
    /// Attempt to acquire the asset lock.
    ///
    /// Uses OS-level file locking via `fs2`, which works across
    /// processes. Non-blocking: if another invocation holds the lock this
    /// returns [`LockError::AlreadyLocked`] immediately.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another invocation holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &AssetPaths) -> Result<Self, LockError> {
        let asset_dir = paths.asset_dir();
        fs::create_dir_all(&asset_dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", asset_dir.display(), e))
        })?;

        let path = paths.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Try to acquire the lock, returning `None` if already held.
    pub fn try_acquire(paths: &AssetPaths) -> Result<Option<Self>, LockError> {
        match Self::acquire(paths) {
            Ok(lock) => Ok(Some(lock)),
            Err(LockError::AlreadyLocked) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether this guard still holds the lock.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the lock file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for AssetLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            // Errors on release are ignored; the OS drops the lock with
            // the file handle regardless.
            let _ = fs2::FileExt::unlock(&file);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AssetName;
    use tempfile::TempDir;

    fn paths_in(dir: &TempDir) -> AssetPaths {
        AssetPaths::new(dir.path().to_path_buf(), AssetName::new("asset").unwrap())
    }

    #[test]
    fn acquire_creates_lock_file_and_holds() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let lock = AssetLock::acquire(&paths).unwrap();
        assert!(lock.is_held());
        assert!(paths.lock_path().is_file());
    }

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let _lock = AssetLock::acquire(&paths).unwrap();
        assert!(matches!(
            AssetLock::acquire(&paths),
            Err(LockError::AlreadyLocked)
        ));
        assert!(AssetLock::try_acquire(&paths).unwrap().is_none());
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        drop(AssetLock::acquire(&paths).unwrap());
        let again = AssetLock::acquire(&paths).unwrap();
        assert!(again.is_held());
    }
}
