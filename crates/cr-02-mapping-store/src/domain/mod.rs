//! # Domain Layer for the Mapping Store
//!
//! - **codec**: compact and legacy on-disk record shapes
//! - **errors**: `StoreError`, `LockError`

pub mod codec;
pub mod errors;
