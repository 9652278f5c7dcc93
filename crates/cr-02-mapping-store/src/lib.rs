//! # Mapping Store (cr-02)
//!
//! The durable correspondence between an origin message and every copy the
//! relay produced for it. One JSON document holds the whole table.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | One record per origin | A key maps to exactly one `FanoutRecord` |
//! | 2 | Atomic writes | Temp file + rename; a crash never tears the live file |
//! | 3 | Corruption is not fatal | An undecodable document reads as an empty table |
//! | 4 | Compact on save | Legacy shapes are read, only the compact shape is written |
//! | 5 | Serialized mutation | Each load-mutate-save runs inside one critical section |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - record codec and errors
//! - `ports/` - the `MappingStore` API
//! - `adapters/` - JSON file store, in-memory store, process lock
//!
//! ## Blocking
//!
//! [`MappingStore`] is synchronous. Each call does small blocking file I/O
//! while holding the store mutex and never suspends. Async callers making a
//! single per-event call invoke it inline; whole-table work such as a
//! retention sweep belongs on `tokio::task::spawn_blocking`.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::file::{JsonFileStore, StoreConfig};
pub use adapters::memory::InMemoryMappingStore;
pub use domain::codec::{decode_record, decode_table, encode_record, encode_table, DecodedTable};
pub use domain::errors::{LockError, StoreError};
pub use ports::inbound::{MappingStore, RemovalOutcome, StoreStats};

#[cfg(feature = "locking")]
pub use adapters::lock::TableLock;
