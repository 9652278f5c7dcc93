//! Inbound ports (API) for the Propagation Engine.

use async_trait::async_trait;
use shared_types::{ActorId, MessageContent, MessageId, OriginId};

use crate::domain::{
    DeleteReport, DeleteRequest, EditReport, OriginEvent, PropagationError, PublishReport,
    ReplyReport, TransitionOutcome,
};

/// Lifecycle transitions of an origin message.
///
/// Each call runs one transition to completion: once a fan-out starts, every
/// target is attempted before the call returns.
#[async_trait]
pub trait PropagationApi: Send + Sync {
    /// Copy a new top-level post to its routed targets and record the copies.
    async fn publish(
        &self,
        message_id: MessageId,
        content: &MessageContent,
    ) -> Result<PublishReport, PropagationError>;

    /// Copy a reply next to every copy of its parent.
    ///
    /// The parent's record is re-read once after a short delay if missing, to
    /// absorb a race with the parent's own publish.
    async fn propagate_reply(
        &self,
        message_id: MessageId,
        reply_to: MessageId,
    ) -> Result<ReplyReport, PropagationError>;

    /// Mirror new content onto every recorded copy.
    async fn propagate_edit(
        &self,
        message_id: MessageId,
        content: &MessageContent,
    ) -> Result<EditReport, PropagationError>;

    /// Delete every copy and the origin message, then drop the record.
    async fn delete(&self, origin: &OriginId) -> Result<DeleteReport, PropagationError>;

    /// An actor forwarded an origin message back: offer deletion if the
    /// message has recorded copies.
    async fn request_delete(
        &self,
        actor: ActorId,
        forwarded_message_id: MessageId,
    ) -> Result<DeleteRequest, PropagationError>;

    /// Run [`PropagationApi::delete`] after re-checking the actor.
    async fn confirm_delete(
        &self,
        actor: ActorId,
        origin: &OriginId,
    ) -> Result<DeleteReport, PropagationError>;

    /// Route one event to its transition.
    async fn dispatch(&self, event: OriginEvent) -> Result<TransitionOutcome, PropagationError> {
        Ok(match event {
            OriginEvent::Post {
                message_id,
                content,
            } => TransitionOutcome::Published(self.publish(message_id, &content).await?),
            OriginEvent::Reply {
                message_id,
                reply_to,
            } => TransitionOutcome::Replied(self.propagate_reply(message_id, reply_to).await?),
            OriginEvent::Edit {
                message_id,
                content,
            } => TransitionOutcome::Edited(self.propagate_edit(message_id, &content).await?),
            OriginEvent::Forward {
                actor,
                forwarded_message_id,
            } => TransitionOutcome::DeleteRequested(
                self.request_delete(actor, forwarded_message_id).await?,
            ),
            OriginEvent::ConfirmDelete { actor, origin } => {
                TransitionOutcome::Deleted(self.confirm_delete(actor, &origin).await?)
            }
        })
    }
}
