//! # File Lock Implementation
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::errors::LockError;

// =============================================================================
// TABLE LOCK
// =============================================================================

/// Exclusive lock on one mapping document.
///
/// The lock lives in a `<document>.lock` sibling holding the owner's PID.
/// Acquired when the store opens, released on drop (RAII).
#[derive(Debug)]
pub struct TableLock {
    /// The lock file handle (kept open to maintain lock)
    file: File,
    /// Path to the lock file
    path: PathBuf,
}

impl TableLock {
    /// Lock-file path for a document path.
    pub fn lock_path_for(document: &Path) -> PathBuf {
        let mut name = document.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Acquire the lock for `document` without blocking.
    ///
    /// A lock file left behind by a process that is no longer running is
    /// reclaimed once.
    ///
    /// # Errors
    ///
    /// Returns `LockError::AlreadyLocked` if a live holder owns the lock.
    pub fn acquire(document: &Path) -> Result<Self, LockError> {
        let lock_path = Self::lock_path_for(document);
        let mut reclaimed = false;

        loop {
            // No truncation before the lock is ours: the holder's PID must survive.
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)
                .map_err(|source| LockError::CreateFailed {
                    path: lock_path.clone(),
                    source,
                })?;

            match file.try_lock_exclusive() {
                Ok(()) => {
                    let pid = std::process::id();
                    let mut locked_file = file;
                    locked_file.set_len(0).map_err(LockError::WriteFailed)?;
                    writeln!(locked_file, "{}", pid).map_err(LockError::WriteFailed)?;
                    locked_file.sync_all().map_err(LockError::WriteFailed)?;

                    return Ok(Self {
                        file: locked_file,
                        path: lock_path,
                    });
                }
                Err(_) => {
                    let existing_pid = Self::read_existing_pid(&lock_path);

                    if let Some(pid) = existing_pid {
                        if !reclaimed && !is_process_running(pid) {
                            // Stale lock from a crashed process
                            drop(file);
                            let _ = std::fs::remove_file(&lock_path);
                            reclaimed = true;
                            continue;
                        }
                    }

                    return Err(LockError::AlreadyLocked {
                        pid: existing_pid,
                        path: lock_path,
                    });
                }
            }
        }
    }

    /// Get the path to the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read PID from existing lock file (for error messages)
    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for TableLock {
    fn drop(&mut self) {
        #[allow(clippy::incompatible_msrv)]
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Checks if a process with the given PID is still running.
pub(super) fn is_process_running(pid: u32) -> bool {
    #[cfg(unix)]
    {
        std::path::Path::new(&format!("/proc/{}", pid)).exists()
    }

    #[cfg(not(unix))]
    {
        // Conservative: assume the holder is alive
        let _ = pid;
        true
    }
}
