//! Ports for the Propagation Engine.
//!
//! - **inbound**: `PropagationApi`, the transitions callers drive
//! - **outbound**: transport, routing and authorization collaborators

pub mod inbound;
pub mod outbound;
