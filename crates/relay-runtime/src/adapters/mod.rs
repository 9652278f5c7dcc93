//! # Adapter Implementations
//!
//! Concrete implementations of the propagation engine's outbound ports:
//!
//! - `JsonRoutingSource` implements `RoutingSource` over the routing and
//!   keyword documents in the data directory
//! - `AdminRegistry` implements `Authorizer` (owner + custom admins)
//! - `DryRunTransport` implements `MessageTransport` without a platform
//!   session

pub mod admins;
pub mod documents;
pub mod routing;
pub mod transport;

pub use admins::{AdminRegistry, AdminUsers};
pub use documents::{load_or_init, DocumentState};
pub use routing::JsonRoutingSource;
pub use transport::DryRunTransport;
