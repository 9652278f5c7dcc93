//! Propagation errors.

use cr_02_mapping_store::StoreError;
use shared_types::{ActorId, ChannelId, MessageId};
use thiserror::Error;

/// Failure of one remote call against the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The platform refused the call (message gone, permission lost...).
    #[error("rejected by channel {channel} for message {message:?}: {reason}")]
    Rejected {
        channel: ChannelId,
        message: Option<MessageId>,
        reason: String,
    },

    /// The platform could not be reached.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Errors that abort a whole transition.
///
/// Per-target remote failures are never errors; they are counted in the
/// transition report.
#[derive(Debug, Error)]
pub enum PropagationError {
    /// Reading the fan-out table failed before any remote call was made.
    #[error("mapping store error: {0}")]
    Store(#[from] StoreError),

    /// The actor may not trigger this transition.
    #[error("actor {actor} is not authorized")]
    Unauthorized { actor: ActorId },
}
