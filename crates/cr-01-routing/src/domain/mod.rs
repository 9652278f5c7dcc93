//! # Domain Layer for Keyword Routing
//!
//! - **keywords**: `KeywordTable`, `classify`, `Axis`, `Classification`
//! - **routing**: `RoutingConfig`, `resolve_targets`
//! - **defaults**: keyword tables shipped with the relay

mod defaults;
mod keywords;
mod routing;

pub use defaults::*;
pub use keywords::*;
pub use routing::*;
