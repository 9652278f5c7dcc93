//! Inbound port (API) for the Mapping Store.

use shared_types::{FanoutRecord, FanoutTable, OriginId};

use crate::domain::errors::StoreError;

/// Size of the table and of its backing document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub entries: usize,
    /// Bytes of the live document (0 for in-memory stores).
    pub file_bytes: u64,
}

/// Result of removing a batch of keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// Keys that were present and got removed.
    pub removed: usize,
    /// Entries left in the table.
    pub remaining: usize,
}

/// Persistent origin id -> fan-out record table.
///
/// Every method is atomic with respect to other in-process callers.
/// `upsert`, `remove` and `remove_many` each run one full load-mutate-save
/// inside the store's critical section, so concurrent transitions touching
/// different keys never lose each other's updates.
pub trait MappingStore: Send + Sync {
    /// Load and decode the full table.
    fn get_all(&self) -> Result<FanoutTable, StoreError>;

    /// Replace the full table.
    fn put_all(&self, table: &FanoutTable) -> Result<(), StoreError>;

    /// Record for one origin message.
    fn get(&self, id: &OriginId) -> Result<Option<FanoutRecord>, StoreError> {
        Ok(self.get_all()?.remove(id))
    }

    /// Insert or replace the record for `id`.
    fn upsert(&self, id: OriginId, record: FanoutRecord) -> Result<(), StoreError>;

    /// Remove the record for `id`. Returns whether it was present.
    fn remove(&self, id: &OriginId) -> Result<bool, StoreError>;

    /// Remove every listed key that is still present.
    fn remove_many(&self, ids: &[OriginId]) -> Result<RemovalOutcome, StoreError>;

    /// Current table size and document size.
    fn stats(&self) -> Result<StoreStats, StoreError>;
}
