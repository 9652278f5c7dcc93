//! Small JSON documents in the data directory (routing, keywords, admins).
//!
//! Read on every use so edits made by the admin surface apply immediately. A
//! missing document is written out with its defaults; an unreadable one is
//! logged and left untouched, and the defaults are used in its place.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{error, info, warn};

/// How a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Decoded from disk.
    Loaded,
    /// Missing; defaults were used and written out.
    Created,
    /// Present but unreadable; defaults were used, the file was not touched.
    Fallback,
}

/// Load `path`, creating it from `default` when missing.
pub fn load_or_init<T, F>(path: &Path, default: F) -> (T, DocumentState)
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let value = default();
            match write_document(path, &value) {
                Ok(()) => info!(path = %path.display(), "Created document with defaults"),
                Err(e) => warn!(path = %path.display(), error = %e, "Could not create document"),
            }
            return (value, DocumentState::Created);
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Could not read document, using defaults");
            return (default(), DocumentState::Fallback);
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => (value, DocumentState::Loaded),
        Err(e) => {
            error!(
                path = %path.display(),
                error = %e,
                "Document is not valid, using defaults and leaving the file as is"
            );
            (default(), DocumentState::Fallback)
        }
    }
}

/// Write `value` as pretty JSON through a temp file and rename.
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    fs::write(&temp, bytes)?;
    fs::rename(&temp, path)
}
