//! # Integration Fixtures
//!
//! Scripted collaborators shared by the scenario and concurrency tests.

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod scenarios;

use async_trait::async_trait;
use cr_01_routing::{KeywordTable, RoutingConfig};
use cr_02_mapping_store::{JsonFileStore, StoreConfig};
use cr_03_propagation::{
    Authorizer, MessageTransport, PropagationConfig, PropagationService, RoutingSnapshot,
    RoutingSource, TransportError,
};
use parking_lot::Mutex;
use shared_types::{ActorId, ChannelId, Media, MessageId};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const ORIGIN: ChannelId = -1000;
pub const C1: ChannelId = -1001;
pub const C2: ChannelId = -1002;
pub const C3: ChannelId = -1003;
pub const ADMIN: ActorId = 42;

/// One remote call as seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Copy {
        target: ChannelId,
        message: MessageId,
        reply_to: Option<MessageId>,
    },
    EditText(ChannelId, MessageId),
    EditMedia(ChannelId, MessageId),
    EditCaption(ChannelId, MessageId),
    Delete(ChannelId, MessageId),
}

/// Records every call; calls against a channel in the failing set fail.
pub struct ScriptedTransport {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<BTreeSet<ChannelId>>,
    next_id: AtomicI64,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(BTreeSet::new()),
            next_id: AtomicI64::new(5_000),
        }
    }

    pub fn failing(channels: &[ChannelId]) -> Self {
        let transport = Self::new();
        transport.fail(channels);
        transport
    }

    pub fn fail(&self, channels: &[ChannelId]) {
        self.failing.lock().extend(channels.iter().copied());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn outcome(&self, channel: ChannelId, call: Call) -> Result<(), TransportError> {
        self.calls.lock().push(call);
        if self.failing.lock().contains(&channel) {
            return Err(TransportError::Rejected {
                channel,
                message: None,
                reason: "scripted failure".into(),
            });
        }
        Ok(())
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageTransport for ScriptedTransport {
    async fn copy_message(
        &self,
        target: ChannelId,
        _source: ChannelId,
        message: MessageId,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, TransportError> {
        self.outcome(
            target,
            Call::Copy {
                target,
                message,
                reply_to,
            },
        )?;
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn edit_text(
        &self,
        channel: ChannelId,
        message: MessageId,
        _text: &str,
    ) -> Result<(), TransportError> {
        self.outcome(channel, Call::EditText(channel, message))
    }

    async fn edit_media(
        &self,
        channel: ChannelId,
        message: MessageId,
        _media: &Media,
        _caption: Option<&str>,
    ) -> Result<(), TransportError> {
        self.outcome(channel, Call::EditMedia(channel, message))
    }

    async fn edit_caption(
        &self,
        channel: ChannelId,
        message: MessageId,
        _caption: Option<&str>,
    ) -> Result<(), TransportError> {
        self.outcome(channel, Call::EditCaption(channel, message))
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        self.outcome(channel, Call::Delete(channel, message))
    }
}

/// Fixed routing: `damas` goes to C1, `toshkent` to C3, everything to C2.
pub struct StaticRouting(pub RoutingSnapshot);

impl StaticRouting {
    pub fn standard() -> Self {
        let mut config = RoutingConfig::default();
        config
            .product_channels
            .insert("damas".into(), BTreeSet::from([C1]));
        config
            .region_channels
            .insert("toshkent".into(), BTreeSet::from([C3]));
        config.always_send.insert(C2);
        Self(RoutingSnapshot {
            config,
            products: KeywordTable::new().with_category("damas", ["damas", "дамас"]),
            regions: KeywordTable::new().with_category("toshkent", ["toshkent", "ташкент"]),
        })
    }
}

impl RoutingSource for StaticRouting {
    fn snapshot(&self) -> RoutingSnapshot {
        self.0.clone()
    }
}

pub struct AllowList(pub BTreeSet<ActorId>);

#[async_trait]
impl Authorizer for AllowList {
    async fn is_authorized(&self, actor: ActorId) -> bool {
        self.0.contains(&actor)
    }
}

pub type FileBackedService =
    PropagationService<JsonFileStore, ScriptedTransport, StaticRouting, AllowList>;

/// Open a JSON store at `path` without the process lock.
pub fn open_store(path: &Path) -> Arc<JsonFileStore> {
    match JsonFileStore::open(StoreConfig {
        path: path.to_path_buf(),
        backup: true,
        process_lock: false,
    }) {
        Ok(store) => Arc::new(store),
        Err(e) => panic!("failed to open mapping store at {}: {e}", path.display()),
    }
}

/// A service over `store` with no pacing delays.
pub fn service(store: Arc<JsonFileStore>, transport: Arc<ScriptedTransport>) -> FileBackedService {
    let config = PropagationConfig {
        origin_channel: ORIGIN,
        edit_delay: Duration::ZERO,
        reply_retry_delay: Duration::ZERO,
    };
    PropagationService::new(
        config,
        store,
        transport,
        Arc::new(StaticRouting::standard()),
        Arc::new(AllowList(BTreeSet::from([ADMIN]))),
    )
}
