//! # Retention Sweeper Subsystem (cr-04)
//!
//! Keeps the fan-out table bounded. Once per interval the sweeper evicts every
//! record older than the retention horizon; edits, replies and deletes of
//! evicted origins then simply find nothing.
//!
//! ## Architecture Role
//!
//! ```text
//! [tokio task] ──sleep(interval)──→ sweep_once(now)
//!                                      │ get_all
//!                                      │ select expired keys
//!                                      ↓ remove_many
//!                               [Mapping Store (2)]
//! ```
//!
//! The sweeper only uses the store's public operations. It never holds the
//! store's critical section across its sleep.

pub mod domain;
pub mod service;

pub use domain::*;
pub use service::RetentionSweeper;
