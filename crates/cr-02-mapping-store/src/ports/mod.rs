//! Port definitions for the Mapping Store.

pub mod inbound;
