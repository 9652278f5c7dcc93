//! # Channel Relay Test Suite
//!
//! Cross-crate scenarios that wire the real JSON mapping store to scripted
//! transports.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs          # Scripted transport, routing and authorizer
//!     ├── scenarios.rs    # Transition scenarios over the JSON store
//!     └── concurrency.rs  # Concurrent transitions, process lock
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cr-tests
//!
//! # By category
//! cargo test -p cr-tests integration::scenarios::
//! cargo test -p cr-tests integration::concurrency::
//! ```

pub mod integration;
