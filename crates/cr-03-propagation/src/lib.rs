//! # Propagation Engine Subsystem (cr-03)
//!
//! Drives every origin message through its lifecycle: a new post is copied to
//! the routed target channels, replies are attached to the parent's copies,
//! edits are mirrored onto every copy, and a confirmed delete removes the
//! copies, the origin message and the fan-out record.
//!
//! ## Architecture Role
//!
//! ```text
//! [Event feed] ──OriginEvent──→ [Propagation (3)] ──snapshot──→ [RoutingSource]
//!                                      │      │
//!                         copy/edit/delete    upsert/remove
//!                                      ↓      ↓
//!                            [MessageTransport] [Mapping Store (2)]
//! ```
//!
//! ## Failure Policy
//!
//! Every remote call is attempted independently per target. A failing target
//! never stops the remaining ones; failures come back as counts in the
//! transition report, never as errors.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::inbound::PropagationApi;
pub use ports::outbound::{Authorizer, MessageTransport, RoutingSnapshot, RoutingSource};
pub use service::{PropagationConfig, PropagationService};
