//! core::ops::lock
//!
//! Exclusive lock on a site document.
//!
//! # Storage
//!
//! - `<site file>.lock` next to the site document, holding an OS-level
//!   exclusive lock
//!
//! # Invariants
//!
//! - Held for the whole command that loads, mutates and flushes a site
//! - Released on drop
//! - Acquisition never blocks: a held lock fails fast
//!
//! The engine itself does not lock; serializing writers is the job of
//! whoever opens the store.
//!
//! # Example
//!
//! ```no_run
//! use slugsync::core::ops::lock::SiteLock;
//! use std::path::Path;
//!
//! let lock = SiteLock::acquire(Path::new("site.json")).unwrap();
//! assert!(lock.is_held());
//! // released when `lock` goes out of scope
//! ```

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("site '{0}' is locked by another slugsync process")]
    AlreadyLocked(PathBuf),

    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive lock on one site document.
#[derive(Debug)]
pub struct SiteLock {
    path: PathBuf,
    file: Option<File>,
}

impl SiteLock {
    /// Lock the site document at `site_path`.
    ///
    /// The document itself need not exist yet.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be opened
    /// - [`LockError::AcquireFailed`] for any other OS failure
    pub fn acquire(site_path: &Path) -> Result<Self, LockError> {
        let path = Self::lock_path(site_path);

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
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                Err(LockError::AlreadyLocked(site_path.to_path_buf()))
            }
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// The lock file used for a site document.
    pub fn lock_path(site_path: &Path) -> PathBuf {
        let mut name: OsString = site_path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Whether this guard still holds the lock.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock before the guard is dropped.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for SiteLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site_in(dir: &TempDir) -> PathBuf {
        dir.path().join("site.json")
    }

    #[test]
    fn acquire_succeeds() {
        let temp = TempDir::new().expect("create temp dir");
        let lock = SiteLock::acquire(&site_in(&temp)).expect("acquire lock");
        assert!(lock.is_held());
        assert!(lock.path().exists());
    }

    #[test]
    fn lock_file_sits_next_to_site() {
        let temp = TempDir::new().expect("create temp dir");
        let lock = SiteLock::acquire(&site_in(&temp)).expect("acquire lock");
        assert_eq!(lock.path(), temp.path().join("site.json.lock"));
    }

    #[test]
    fn second_acquire_fails() {
        let temp = TempDir::new().expect("create temp dir");
        let _held = SiteLock::acquire(&site_in(&temp)).expect("first acquire");

        let result = SiteLock::acquire(&site_in(&temp));
        assert!(matches!(result, Err(LockError::AlreadyLocked(_))));
    }

    #[test]
    fn released_on_drop() {
        let temp = TempDir::new().expect("create temp dir");
        {
            let _lock = SiteLock::acquire(&site_in(&temp)).expect("first acquire");
        }
        let again = SiteLock::acquire(&site_in(&temp)).expect("second acquire");
        assert!(again.is_held());
    }

    #[test]
    fn release_is_repeatable() {
        let temp = TempDir::new().expect("create temp dir");
        let mut lock = SiteLock::acquire(&site_in(&temp)).expect("acquire");

        lock.release().expect("first release");
        lock.release().expect("second release");
        assert!(!lock.is_held());

        let again = SiteLock::acquire(&site_in(&temp)).expect("reacquire");
        assert!(again.is_held());
    }

    #[test]
    fn different_sites_do_not_contend() {
        let temp = TempDir::new().expect("create temp dir");
        let _a = SiteLock::acquire(&temp.path().join("a.json")).expect("lock a");
        let b = SiteLock::acquire(&temp.path().join("b.json")).expect("lock b");
        assert!(b.is_held());
    }
}
