//! # Propagation Service
//!
//! Implements [`PropagationApi`] on top of four outbound collaborators:
//! - [`MappingStore`]: the durable fan-out table
//! - [`MessageTransport`]: remote copy/edit/delete calls
//! - [`RoutingSource`]: routing configuration and keyword tables
//! - [`Authorizer`]: capability check for deletion
//!
//! ## Transitions
//!
//! | Event | Reads table | Remote calls | Writes table |
//! |-------|-------------|--------------|--------------|
//! | publish | no | one copy per resolved target | `upsert` flat record if any copy succeeded |
//! | reply | parent (retried once) | one copy per parent copy | `upsert` reply record if any copy succeeded |
//! | edit | own record | one edit per copy | no |
//! | delete | own record | one delete per copy + origin | `remove` |
//!
//! Remote calls run sequentially. Edits are spaced by
//! [`PropagationConfig::edit_delay`] to stay under platform rate limits.
//!
//! Store calls are made inline on the worker thread. Each is one short
//! read or load-mutate-save of the mapping file, and no store lock is held
//! across an `.await`.

use async_trait::async_trait;
use cr_01_routing::{classify_both, RoutingConfig};
use cr_02_mapping_store::MappingStore;
use shared_types::{
    ActorId, ChannelId, FanoutRecord, MessageContent, MessageId, OriginId, SystemTimeSource,
    TargetMap, TimeSource,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::domain::{
    select_edit, DeleteReport, DeleteRequest, EditAction, EditReport, PropagationError,
    PublishReport, ReplyReport, TransportError,
};
use crate::ports::inbound::PropagationApi;
use crate::ports::outbound::{Authorizer, MessageTransport, RoutingSource};

/// Propagation policy knobs.
#[derive(Clone, Debug)]
pub struct PropagationConfig {
    /// Channel every origin message lives in.
    pub origin_channel: ChannelId,
    /// Pause between successive remote edit calls.
    pub edit_delay: Duration,
    /// Pause before re-reading a missing parent record for a reply.
    pub reply_retry_delay: Duration,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            origin_channel: 0,
            edit_delay: Duration::from_millis(200),
            reply_retry_delay: Duration::from_millis(200),
        }
    }
}

/// Propagation Engine service.
///
/// Thread-safe; share it across tasks behind an `Arc`. Each transition only
/// touches the table through the store's atomic `get`/`upsert`/`remove`, so
/// concurrent transitions never drop each other's records.
pub struct PropagationService<S, T, R, A>
where
    S: MappingStore,
    T: MessageTransport,
    R: RoutingSource,
    A: Authorizer,
{
    config: PropagationConfig,
    store: Arc<S>,
    transport: Arc<T>,
    routing: Arc<R>,
    authorizer: Arc<A>,
    clock: Arc<dyn TimeSource>,
}

impl<S, T, R, A> PropagationService<S, T, R, A>
where
    S: MappingStore,
    T: MessageTransport,
    R: RoutingSource,
    A: Authorizer,
{
    pub fn new(
        config: PropagationConfig,
        store: Arc<S>,
        transport: Arc<T>,
        routing: Arc<R>,
        authorizer: Arc<A>,
    ) -> Self {
        Self {
            config,
            store,
            transport,
            routing,
            authorizer,
            clock: Arc::new(SystemTimeSource),
        }
    }

    /// Replace the clock used to stamp new records.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // =========================================================================
    // FAN-OUT HELPERS
    // =========================================================================

    /// Copy `message` to every `(target, reply_to)` pair. Returns the copies
    /// that succeeded and the targets that failed. `names` labels failures.
    async fn copy_to(
        &self,
        targets: Vec<(ChannelId, Option<MessageId>)>,
        message: MessageId,
        names: &RoutingConfig,
    ) -> (TargetMap, Vec<ChannelId>) {
        let mut copied = TargetMap::new();
        let mut failed = Vec::new();

        for (target, reply_to) in targets {
            match self
                .transport
                .copy_message(target, self.config.origin_channel, message, reply_to)
                .await
            {
                Ok(copy) => {
                    debug!(channel = target, copy, "Copy sent");
                    copied.insert(target, copy);
                }
                Err(e) => {
                    warn!(
                        channel = target,
                        channel_name = %names.display_name(target),
                        error = %e,
                        "Copy failed"
                    );
                    failed.push(target);
                }
            }
        }

        (copied, failed)
    }

    /// Persist a record. A failed write is logged, never raised: the copies
    /// already exist and cannot be rolled back.
    fn record(&self, origin: &OriginId, record: FanoutRecord) -> bool {
        match self.store.upsert(origin.clone(), record) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to record fan-out; copies will not be synchronized");
                false
            }
        }
    }

    async fn apply_edit(
        &self,
        channel: ChannelId,
        message: MessageId,
        action: &EditAction,
    ) -> Result<(), TransportError> {
        match action {
            EditAction::Text(text) => self.transport.edit_text(channel, message, text).await,
            EditAction::Media { media, caption } => {
                self.transport
                    .edit_media(channel, message, media, caption.as_deref())
                    .await
            }
            EditAction::Caption(caption) => {
                self.transport
                    .edit_caption(channel, message, Some(caption))
                    .await
            }
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    async fn run_publish(
        &self,
        message_id: MessageId,
        content: &MessageContent,
    ) -> PublishReport {
        let origin = OriginId::from(message_id);
        let snapshot = self.routing.snapshot();
        let classification = classify_both(
            content.classification_text(),
            &snapshot.products,
            &snapshot.regions,
        );
        let resolved = snapshot.config.resolve(&classification);

        debug!(
            product = ?classification.product,
            region = ?classification.region,
            targets = resolved.len(),
            "Post classified"
        );

        let mut report = PublishReport {
            origin: origin.clone(),
            classification,
            resolved,
            ..Default::default()
        };

        if report.resolved.is_empty() {
            info!("No target channels resolved, post not propagated");
            return report;
        }

        let targets = report.resolved.iter().map(|&c| (c, None)).collect();
        let (copied, failed) = self
            .copy_to(targets, message_id, &snapshot.config)
            .await;

        if copied.is_empty() {
            warn!(failed = failed.len(), "No copy succeeded, nothing recorded");
        } else {
            report.recorded = self.record(
                &origin,
                FanoutRecord::flat(copied.clone(), self.clock.now()),
            );
        }

        info!(
            resolved = report.resolved.len(),
            copied = copied.len(),
            failed = failed.len(),
            recorded = report.recorded,
            "Post propagated"
        );
        report.copied = copied;
        report.failed = failed;
        report
    }

    async fn run_reply(
        &self,
        message_id: MessageId,
        reply_to: MessageId,
    ) -> Result<ReplyReport, PropagationError> {
        let parent = OriginId::from(reply_to);
        let mut report = ReplyReport {
            origin: OriginId::from(message_id),
            reply_to: parent.clone(),
            ..Default::default()
        };

        let mut parent_record = self.store.get(&parent)?;
        if parent_record.is_none() {
            debug!(parent = %parent, "Parent record missing, re-reading once");
            tokio::time::sleep(self.config.reply_retry_delay).await;
            parent_record = self.store.get(&parent)?;
        }

        let Some(parent_record) = parent_record else {
            warn!(parent = %parent, "No copies recorded for parent, reply not propagated");
            return Ok(report);
        };
        report.parent_found = true;

        let targets = parent_record
            .targets()
            .iter()
            .map(|(&channel, &copy)| (channel, Some(copy)))
            .collect();
        let routing = self.routing.snapshot();
        let (copied, failed) = self
            .copy_to(targets, message_id, &routing.config)
            .await;

        if copied.is_empty() {
            warn!(failed = failed.len(), "No reply copy succeeded, nothing recorded");
        } else {
            report.recorded = self.record(
                &report.origin,
                FanoutRecord::reply(parent, copied.clone(), self.clock.now()),
            );
        }

        info!(
            copied = copied.len(),
            failed = failed.len(),
            recorded = report.recorded,
            "Reply propagated"
        );
        report.copied = copied;
        report.failed = failed;
        Ok(report)
    }

    async fn run_edit(
        &self,
        message_id: MessageId,
        content: &MessageContent,
    ) -> Result<EditReport, PropagationError> {
        let origin = OriginId::from(message_id);
        let mut report = EditReport {
            origin: origin.clone(),
            ..Default::default()
        };

        let Some(record) = self.store.get(&origin)? else {
            debug!("No copies recorded, edit ignored");
            return Ok(report);
        };
        report.found = true;

        let Some(action) = select_edit(content) else {
            report.unsupported = record.targets().len();
            warn!(
                copies = report.unsupported,
                "Unsupported content type, edit not mirrored"
            );
            return Ok(report);
        };

        for (i, (&channel, &copy)) in record.targets().iter().enumerate() {
            if i > 0 && !self.config.edit_delay.is_zero() {
                tokio::time::sleep(self.config.edit_delay).await;
            }
            match self.apply_edit(channel, copy, &action).await {
                Ok(()) => {
                    debug!(channel, copy, kind = action.kind(), "Copy edited");
                    report.edited += 1;
                }
                Err(e) => {
                    warn!(channel, copy, error = %e, "Edit failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            kind = action.kind(),
            edited = report.edited,
            failed = report.failed,
            "Edit mirrored"
        );
        Ok(report)
    }

    async fn run_delete(&self, origin: &OriginId) -> Result<DeleteReport, PropagationError> {
        let mut report = DeleteReport {
            origin: origin.clone(),
            ..Default::default()
        };

        let Some(record) = self.store.get(origin)? else {
            info!("No copies recorded, nothing to delete");
            return Ok(report);
        };
        report.found = true;

        for (&channel, &copy) in record.targets() {
            match self.transport.delete_message(channel, copy).await {
                Ok(()) => {
                    debug!(channel, copy, "Copy deleted");
                    report.deleted += 1;
                }
                Err(e) => {
                    warn!(channel, copy, error = %e, "Copy delete failed");
                    report.failed += 1;
                }
            }
        }

        report.origin_deleted = match origin.as_message_id() {
            Some(message) => match self
                .transport
                .delete_message(self.config.origin_channel, message)
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Origin delete failed");
                    false
                }
            },
            None => {
                warn!("Origin id is not numeric, origin message left in place");
                false
            }
        };
        if report.origin_deleted {
            report.deleted += 1;
        } else {
            report.failed += 1;
        }

        report.removed = match self.store.remove(origin) {
            Ok(removed) => removed,
            Err(e) => {
                error!(error = %e, "Failed to remove fan-out record");
                false
            }
        };

        info!(
            deleted = report.deleted,
            failed = report.failed,
            removed = report.removed,
            "Origin message deleted"
        );
        Ok(report)
    }

    async fn run_request_delete(
        &self,
        actor: ActorId,
        origin: OriginId,
    ) -> Result<DeleteRequest, PropagationError> {
        if !self.authorizer.is_authorized(actor).await {
            info!(actor, "Forward from unauthorized actor ignored");
            return Ok(DeleteRequest::Unauthorized);
        }
        Ok(match self.store.get(&origin)? {
            Some(record) => DeleteRequest::Confirm {
                reply_to: record.reply_to().cloned(),
                origin,
            },
            None => {
                info!("Forwarded message has no recorded copies");
                DeleteRequest::NotFound
            }
        })
    }

    async fn run_confirm_delete(
        &self,
        actor: ActorId,
        origin: &OriginId,
    ) -> Result<DeleteReport, PropagationError> {
        if !self.authorizer.is_authorized(actor).await {
            warn!(actor, "Delete confirmation from unauthorized actor rejected");
            return Err(PropagationError::Unauthorized { actor });
        }
        self.run_delete(origin).await
    }
}

fn transition_span(kind: &'static str, origin: &OriginId) -> Span {
    info_span!(
        "transition",
        kind,
        origin = %origin,
        correlation_id = %Uuid::new_v4()
    )
}

#[async_trait]
impl<S, T, R, A> PropagationApi for PropagationService<S, T, R, A>
where
    S: MappingStore + 'static,
    T: MessageTransport + 'static,
    R: RoutingSource + 'static,
    A: Authorizer + 'static,
{
    async fn publish(
        &self,
        message_id: MessageId,
        content: &MessageContent,
    ) -> Result<PublishReport, PropagationError> {
        let span = transition_span("publish", &OriginId::from(message_id));
        Ok(self.run_publish(message_id, content).instrument(span).await)
    }

    async fn propagate_reply(
        &self,
        message_id: MessageId,
        reply_to: MessageId,
    ) -> Result<ReplyReport, PropagationError> {
        let span = transition_span("reply", &OriginId::from(message_id));
        self.run_reply(message_id, reply_to).instrument(span).await
    }

    async fn propagate_edit(
        &self,
        message_id: MessageId,
        content: &MessageContent,
    ) -> Result<EditReport, PropagationError> {
        let span = transition_span("edit", &OriginId::from(message_id));
        self.run_edit(message_id, content).instrument(span).await
    }

    async fn delete(&self, origin: &OriginId) -> Result<DeleteReport, PropagationError> {
        let span = transition_span("delete", origin);
        self.run_delete(origin).instrument(span).await
    }

    async fn request_delete(
        &self,
        actor: ActorId,
        forwarded_message_id: MessageId,
    ) -> Result<DeleteRequest, PropagationError> {
        let origin = OriginId::from(forwarded_message_id);
        let span = transition_span("request_delete", &origin);
        self.run_request_delete(actor, origin).instrument(span).await
    }

    async fn confirm_delete(
        &self,
        actor: ActorId,
        origin: &OriginId,
    ) -> Result<DeleteReport, PropagationError> {
        let span = transition_span("confirm_delete", origin);
        self.run_confirm_delete(actor, origin).instrument(span).await
    }
}
