//! # Shared Types Crate
//!
//! Domain entities shared across the relay subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers and fan-out records are defined
//!   once here and used by routing, storage, propagation and retention.
//! - **No I/O**: this crate only holds types and pure helpers.

pub mod entities;
pub mod time;

pub use entities::*;
pub use time::{FixedTimeSource, SystemTimeSource, TimeSource, Timestamp};
