//! # Domain Errors
//!
//! Error types for the Mapping Store.
//!
//! Decode failures are deliberately absent: an undecodable document is an
//! empty table, not an error.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the table.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming the document failed.
    #[error("mapping store I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The in-memory table could not be serialized.
    #[error("failed to encode fan-out table: {0}")]
    Encode(#[from] serde_json::Error),

    /// Another process owns the table file.
    #[error(transparent)]
    Lock(#[from] LockError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from the process-level table lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file could not be created or opened.
    #[error("failed to create lock file {}: {source}", .path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The table is already locked by another holder.
    #[error("mapping table already in use{} ({})", holder(.pid), .path.display())]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    /// Failed to record our PID in the lock file.
    #[error("failed to write PID to lock file: {0}")]
    WriteFailed(#[source] io::Error),
}

fn holder(pid: &Option<u32>) -> String {
    pid.map(|p| format!(" by process {p}")).unwrap_or_default()
}
