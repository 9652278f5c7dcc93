//! # Adapters
//!
//! - `file`: JSON document on disk (production)
//! - `memory`: in-process table (tests, dry runs)
//! - `lock`: exclusive process lock next to the table file

pub mod file;
#[cfg(feature = "locking")]
pub mod lock;
pub mod memory;
