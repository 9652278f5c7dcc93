//! # Event Handlers
//!
//! Feeds origin-channel events into the relay runtime.

pub mod event_feed;

pub use event_feed::*;
