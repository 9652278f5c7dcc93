//! # Relay Container
//!
//! Configuration and the wiring of the store, engine and sweeper into one
//! runtime.

pub mod config;
pub mod runtime;

pub use config::{AccessConfig, ConfigError, RelayConfig, RoutingSeed, StorageConfig};
pub use runtime::{RelayRuntime, RelayService, RuntimeError};
