//! # Table Process Locking
//!
//! Prevents two processes from mutating the same mapping document.
//!
//! ## Modules
//!
//! - `flock`: `TableLock` implementation using fs2

mod flock;

pub use flock::TableLock;
