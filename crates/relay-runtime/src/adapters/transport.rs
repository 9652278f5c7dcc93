//! Transport that only logs.
//!
//! Lets the binary drive the engine end to end without a platform session:
//! copies get locally allocated ids, edits and deletes always succeed.

use async_trait::async_trait;
use cr_03_propagation::{MessageTransport, TransportError};
use shared_types::{ChannelId, Media, MessageId};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tracing::info;

pub struct DryRunTransport {
    next_id: AtomicI64,
    calls: AtomicU64,
}

impl DryRunTransport {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// First copy gets `first_id`.
    pub fn starting_at(first_id: MessageId) -> Self {
        Self {
            next_id: AtomicI64::new(first_id),
            calls: AtomicU64::new(0),
        }
    }

    /// Remote calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for DryRunTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageTransport for DryRunTransport {
    async fn copy_message(
        &self,
        target: ChannelId,
        source: ChannelId,
        message: MessageId,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, TransportError> {
        self.count();
        let copy = self.next_id.fetch_add(1, Ordering::SeqCst);
        info!(channel = target, from = source, message, ?reply_to, copy, "[dry-run] copy_message");
        Ok(copy)
    }

    async fn edit_text(
        &self,
        channel: ChannelId,
        message: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        self.count();
        info!(channel, message, chars = text.chars().count(), "[dry-run] edit_text");
        Ok(())
    }

    async fn edit_media(
        &self,
        channel: ChannelId,
        message: MessageId,
        media: &Media,
        caption: Option<&str>,
    ) -> Result<(), TransportError> {
        self.count();
        info!(channel, message, ?media, ?caption, "[dry-run] edit_media");
        Ok(())
    }

    async fn edit_caption(
        &self,
        channel: ChannelId,
        message: MessageId,
        caption: Option<&str>,
    ) -> Result<(), TransportError> {
        self.count();
        info!(channel, message, ?caption, "[dry-run] edit_caption");
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        self.count();
        info!(channel, message, "[dry-run] delete_message");
        Ok(())
    }
}
