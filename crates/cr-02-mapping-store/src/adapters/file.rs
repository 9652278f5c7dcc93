use parking_lot::Mutex;
use shared_types::{FanoutRecord, FanoutTable, OriginId};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::domain::codec;
use crate::domain::errors::StoreError;
use crate::ports::inbound::{MappingStore, RemovalOutcome, StoreStats};

#[cfg(feature = "locking")]
use crate::adapters::lock::TableLock;

/// Configuration for the JSON file store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Live document path.
    pub path: PathBuf,
    /// Copy the live document to `<path>.backup` before each overwrite.
    pub backup: bool,
    /// Hold an exclusive process lock on `<path>.lock` while open.
    pub process_lock: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/mapping.json"),
            backup: true,
            process_lock: true,
        }
    }
}

impl StoreConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// File-backed mapping store.
///
/// The whole table lives in one JSON document. Every operation re-reads the
/// document, so the file is the only source of truth. Writes go to
/// `<path>.tmp`, are fsynced, then renamed over the live file; a crash
/// mid-write leaves the previous durable state intact.
pub struct JsonFileStore {
    path: PathBuf,
    backup: bool,
    /// Serializes every load and every load-mutate-save in this process.
    critical: Mutex<()>,
    #[cfg(feature = "locking")]
    _process_lock: Option<TableLock>,
}

impl JsonFileStore {
    /// Open (or prepare) the document at `config.path`.
    ///
    /// Creates the parent directory. Does not create the document; a missing
    /// document reads as an empty table.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let path = config.path;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        #[cfg(feature = "locking")]
        let process_lock = if config.process_lock {
            Some(TableLock::acquire(&path)?)
        } else {
            None
        };

        match fs::metadata(&path) {
            Ok(metadata) => info!(
                path = %path.display(),
                bytes = metadata.len(),
                "Found existing mapping document"
            ),
            Err(_) => info!(path = %path.display(), "No mapping document yet, starting empty"),
        }

        Ok(Self {
            path,
            backup: config.backup,
            critical: Mutex::new(()),
            #[cfg(feature = "locking")]
            _process_lock: process_lock,
        })
    }

    /// Live document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<path>.backup`
    pub fn backup_path(&self) -> PathBuf {
        sibling(&self.path, ".backup")
    }

    /// `<path>.tmp`
    pub fn temp_path(&self) -> PathBuf {
        sibling(&self.path, ".tmp")
    }

    /// Read and decode the document. Caller holds `critical`.
    fn load_locked(&self) -> Result<FanoutTable, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FanoutTable::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(FanoutTable::new());
        }

        match codec::decode_table(&bytes) {
            Ok(decoded) => {
                if !decoded.skipped.is_empty() {
                    warn!(
                        path = %self.path.display(),
                        skipped = decoded.skipped.len(),
                        "Skipped mapping entries with an unknown shape"
                    );
                }
                Ok(decoded.table)
            }
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    error = %e,
                    "Mapping document is corrupt, continuing with an empty table"
                );
                Ok(FanoutTable::new())
            }
        }
    }

    /// Encode and atomically replace the document. Caller holds `critical`.
    fn save_locked(&self, table: &FanoutTable) -> Result<(), StoreError> {
        let bytes = codec::encode_table(table)?;

        if self.backup {
            match fs::copy(&self.path, self.backup_path()) {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    path = %self.backup_path().display(),
                    error = %e,
                    "Backup copy failed, saving anyway"
                ),
            }
        }

        let temp_path = self.temp_path();
        let written = File::create(&temp_path).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::io(&temp_path, e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::io(&self.path, e));
        }

        debug!(
            path = %self.path.display(),
            entries = table.len(),
            bytes = bytes.len(),
            "Mapping document saved"
        );
        Ok(())
    }
}

impl MappingStore for JsonFileStore {
    fn get_all(&self) -> Result<FanoutTable, StoreError> {
        let _guard = self.critical.lock();
        self.load_locked()
    }

    fn put_all(&self, table: &FanoutTable) -> Result<(), StoreError> {
        let _guard = self.critical.lock();
        self.save_locked(table)
    }

    fn upsert(&self, id: OriginId, record: FanoutRecord) -> Result<(), StoreError> {
        let _guard = self.critical.lock();
        let mut table = self.load_locked()?;
        table.insert(id, record);
        self.save_locked(&table)
    }

    fn remove(&self, id: &OriginId) -> Result<bool, StoreError> {
        let _guard = self.critical.lock();
        let mut table = self.load_locked()?;
        if table.remove(id).is_none() {
            return Ok(false);
        }
        self.save_locked(&table)?;
        Ok(true)
    }

    fn remove_many(&self, ids: &[OriginId]) -> Result<RemovalOutcome, StoreError> {
        let _guard = self.critical.lock();
        let mut table = self.load_locked()?;
        let removed = ids.iter().filter(|id| table.remove(*id).is_some()).count();
        if removed > 0 {
            self.save_locked(&table)?;
        }
        Ok(RemovalOutcome {
            removed,
            remaining: table.len(),
        })
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let _guard = self.critical.lock();
        let entries = self.load_locked()?.len();
        let file_bytes = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        Ok(StoreStats {
            entries,
            file_bytes,
        })
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
