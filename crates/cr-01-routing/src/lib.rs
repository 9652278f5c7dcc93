//! # Keyword Routing Subsystem (cr-01)
//!
//! Decides where an origin post goes. Two independent keyword tables classify
//! the post text on two axes (product line and region); the routing
//! configuration turns the matched categories into a set of target channels.
//!
//! ## Architecture Role
//!
//! ```text
//! origin text ──classify(products)──→ product? ┐
//!             ──classify(regions)───→ region?  ├──→ RoutingConfig::resolve ──→ {channels}
//!                          always_send_to ─────┘
//! ```
//!
//! Everything here is pure: no I/O, no logging, no shared state. Loading the
//! documents from disk is the runtime's job.

pub mod domain;

pub use domain::*;
