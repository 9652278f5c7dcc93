//! Events that drive a transition, and what each transition returns.

use serde::{Deserialize, Serialize};
use shared_types::{ActorId, MessageContent, MessageId, OriginId};

use super::reports::{DeleteReport, DeleteRequest, EditReport, PublishReport, ReplyReport};

/// An event observed on the origin channel or from an admin.
///
/// Serialized with a `type` tag so the runtime can read events as
/// newline-delimited JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OriginEvent {
    /// New top-level post in the origin channel.
    Post {
        message_id: MessageId,
        #[serde(default)]
        content: MessageContent,
    },
    /// New post replying to `reply_to` in the origin channel.
    Reply {
        message_id: MessageId,
        reply_to: MessageId,
    },
    /// An origin post was edited; `content` is the new content.
    Edit {
        message_id: MessageId,
        #[serde(default)]
        content: MessageContent,
    },
    /// An actor forwarded an origin message back to the relay.
    Forward {
        actor: ActorId,
        forwarded_message_id: MessageId,
    },
    /// An actor confirmed deletion of an origin message.
    ConfirmDelete { actor: ActorId, origin: OriginId },
}

impl OriginEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            OriginEvent::Post { .. } => "post",
            OriginEvent::Reply { .. } => "reply",
            OriginEvent::Edit { .. } => "edit",
            OriginEvent::Forward { .. } => "forward",
            OriginEvent::ConfirmDelete { .. } => "confirm_delete",
        }
    }

    /// Origin message the event is about.
    pub fn origin(&self) -> OriginId {
        match self {
            OriginEvent::Post { message_id, .. }
            | OriginEvent::Reply { message_id, .. }
            | OriginEvent::Edit { message_id, .. } => OriginId::from(*message_id),
            OriginEvent::Forward {
                forwarded_message_id,
                ..
            } => OriginId::from(*forwarded_message_id),
            OriginEvent::ConfirmDelete { origin, .. } => origin.clone(),
        }
    }
}

/// Result of dispatching one [`OriginEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Published(PublishReport),
    Replied(ReplyReport),
    Edited(EditReport),
    DeleteRequested(DeleteRequest),
    Deleted(DeleteReport),
}
