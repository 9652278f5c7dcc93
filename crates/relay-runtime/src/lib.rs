//! # Relay Runtime Library
//!
//! This library exposes the internal modules of the relay runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Layout
//!
//! - `container/` - Configuration and the wired [`RelayRuntime`]
//! - `adapters/` - Data-directory documents, admin registry, dry-run transport
//! - `handlers/` - Newline-delimited JSON event feed

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod handlers;

pub use container::{ConfigError, RelayConfig, RelayRuntime, RelayService, RuntimeError};
pub use handlers::{EventFeedHandler, FeedStats};
