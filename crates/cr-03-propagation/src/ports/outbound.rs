//! Outbound ports (SPI) for the Propagation Engine.

use async_trait::async_trait;
use cr_01_routing::{KeywordTable, RoutingConfig};
use shared_types::{ActorId, ChannelId, Media, MessageId};

use crate::domain::TransportError;

/// Remote message operations of the chat platform.
///
/// Each call is one atomic remote operation that either succeeds or fails.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Copy `message` from `source` into `target`, optionally as a reply to
    /// `reply_to` in the target channel. Returns the copy's id.
    async fn copy_message(
        &self,
        target: ChannelId,
        source: ChannelId,
        message: MessageId,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, TransportError>;

    async fn edit_text(
        &self,
        channel: ChannelId,
        message: MessageId,
        text: &str,
    ) -> Result<(), TransportError>;

    async fn edit_media(
        &self,
        channel: ChannelId,
        message: MessageId,
        media: &Media,
        caption: Option<&str>,
    ) -> Result<(), TransportError>;

    async fn edit_caption(
        &self,
        channel: ChannelId,
        message: MessageId,
        caption: Option<&str>,
    ) -> Result<(), TransportError>;

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), TransportError>;
}

/// Consistent view of routing state for one transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingSnapshot {
    pub config: RoutingConfig,
    pub products: KeywordTable,
    pub regions: KeywordTable,
}

/// Source of the routing configuration and keyword tables.
///
/// Read once per publish so admin edits apply to the next post.
pub trait RoutingSource: Send + Sync {
    fn snapshot(&self) -> RoutingSnapshot;
}

/// Capability check for privileged transitions.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn is_authorized(&self, actor: ActorId) -> bool;
}
