use parking_lot::Mutex;
use shared_types::{FanoutRecord, FanoutTable, OriginId};

use crate::domain::errors::StoreError;
use crate::ports::inbound::{MappingStore, RemovalOutcome, StoreStats};

/// In-memory mapping store for unit tests and dry runs.
///
/// Same contract as [`crate::JsonFileStore`] without the document.
#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    table: Mutex<FanoutTable>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `table`.
    pub fn with_table(table: FanoutTable) -> Self {
        Self {
            table: Mutex::new(table),
        }
    }
}

impl MappingStore for InMemoryMappingStore {
    fn get_all(&self) -> Result<FanoutTable, StoreError> {
        Ok(self.table.lock().clone())
    }

    fn put_all(&self, table: &FanoutTable) -> Result<(), StoreError> {
        *self.table.lock() = table.clone();
        Ok(())
    }

    fn get(&self, id: &OriginId) -> Result<Option<FanoutRecord>, StoreError> {
        Ok(self.table.lock().get(id).cloned())
    }

    fn upsert(&self, id: OriginId, record: FanoutRecord) -> Result<(), StoreError> {
        self.table.lock().insert(id, record);
        Ok(())
    }

    fn remove(&self, id: &OriginId) -> Result<bool, StoreError> {
        Ok(self.table.lock().remove(id).is_some())
    }

    fn remove_many(&self, ids: &[OriginId]) -> Result<RemovalOutcome, StoreError> {
        let mut table = self.table.lock();
        let removed = ids.iter().filter(|id| table.remove(*id).is_some()).count();
        Ok(RemovalOutcome {
            removed,
            remaining: table.len(),
        })
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        Ok(StoreStats {
            entries: self.table.lock().len(),
            file_bytes: 0,
        })
    }
}
