//! # Domain Layer for Retention
//!
//! - **policy**: horizon, interval, effective timestamps
//! - **report**: `SweepReport`

mod policy;
mod report;

pub use policy::*;
pub use report::*;
