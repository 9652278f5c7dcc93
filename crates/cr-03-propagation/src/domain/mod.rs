//! # Domain Layer for Propagation
//!
//! - **events**: `OriginEvent` and `TransitionOutcome`
//! - **edit**: content-type precedence for mirrored edits
//! - **reports**: per-transition result counts
//! - **errors**: `PropagationError`, `TransportError`

pub mod edit;
pub mod errors;
pub mod events;
pub mod reports;

pub use edit::{select_edit, EditAction};
pub use errors::{PropagationError, TransportError};
pub use events::{OriginEvent, TransitionOutcome};
pub use reports::{DeleteReport, DeleteRequest, EditReport, PublishReport, ReplyReport};
