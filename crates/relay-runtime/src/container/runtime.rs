//! # Relay Runtime
//!
//! Owns the mapping store, the propagation service and the retention sweeper.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Open the mapping document (takes the process lock)
//! 3. Wire routing documents, admin registry and transport into the service
//! 4. `start()`: materialize missing documents, spawn the sweeper
//! 5. `dispatch()` transitions until `shutdown()`

use cr_02_mapping_store::{JsonFileStore, MappingStore, StoreConfig, StoreError};
use cr_03_propagation::{
    MessageTransport, OriginEvent, PropagationApi, PropagationError, PropagationService,
    RoutingSource, TransitionOutcome,
};
use cr_04_retention::RetentionSweeper;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::config::{ConfigError, RelayConfig};
use crate::adapters::{AdminRegistry, JsonRoutingSource};

/// The propagation service as wired by the runtime.
pub type RelayService<T> = PropagationService<JsonFileStore, T, JsonRoutingSource, AdminRegistry>;

/// Errors that prevent the runtime from starting.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("mapping store error: {0}")]
    Store(#[from] StoreError),
}

/// The relay runtime.
pub struct RelayRuntime<T: MessageTransport + 'static> {
    config: RelayConfig,
    store: Arc<JsonFileStore>,
    routing: Arc<JsonRoutingSource>,
    admins: Arc<AdminRegistry>,
    service: Arc<RelayService<T>>,
    sweeper: Arc<RetentionSweeper<JsonFileStore>>,
    shutdown_tx: watch::Sender<bool>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<T: MessageTransport + 'static> RelayRuntime<T> {
    /// Open the store and wire every subsystem. Does not spawn anything.
    pub fn new(config: RelayConfig, transport: Arc<T>) -> Result<Self, RuntimeError> {
        config.validate()?;
        info!(
            data_dir = %config.storage.data_dir.display(),
            origin_channel = config.propagation.origin_channel,
            "Creating relay runtime"
        );

        let store = Arc::new(JsonFileStore::open(StoreConfig {
            path: config.storage.mapping_path(),
            backup: config.storage.backup,
            process_lock: true,
        })?);
        let routing = Arc::new(JsonRoutingSource::new(
            &config.storage,
            config.routing.clone(),
        ));
        let admins = Arc::new(AdminRegistry::new(
            config.access.owner_id,
            config.storage.admins_path(),
        ));
        let service = Arc::new(PropagationService::new(
            config.propagation.clone(),
            Arc::clone(&store),
            transport,
            Arc::clone(&routing),
            Arc::clone(&admins),
        ));
        let sweeper = Arc::new(RetentionSweeper::new(
            Arc::clone(&store),
            config.retention.clone(),
        ));
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            store,
            routing,
            admins,
            service,
            sweeper,
            shutdown_tx,
            sweeper_handle: Mutex::new(None),
        })
    }

    /// Create missing documents and spawn the retention sweeper.
    ///
    /// Must be called from within a tokio runtime. A second call is ignored.
    pub fn start(&self) {
        let mut handle = self.sweeper_handle.lock();
        if handle.is_some() {
            warn!("Relay runtime already started");
            return;
        }

        let snapshot = self.routing.snapshot();
        let admins = self.admins.users();
        match self.store.stats() {
            Ok(stats) => info!(
                entries = stats.entries,
                file_bytes = stats.file_bytes,
                "Mapping table loaded"
            ),
            Err(e) => error!(error = %e, "Mapping table unreadable at startup"),
        }
        info!(
            product_categories = snapshot.products.len(),
            region_categories = snapshot.regions.len(),
            routed_channels = snapshot.config.all_targets().len(),
            custom_admins = admins.custom_admins.len(),
            "Routing documents ready"
        );

        *handle = Some(Arc::clone(&self.sweeper).spawn(self.shutdown_tx.subscribe()));
        info!("Relay runtime started");
    }

    /// Run one transition.
    pub async fn dispatch(&self, event: OriginEvent) -> Result<TransitionOutcome, PropagationError> {
        self.service.dispatch(event).await
    }

    /// Signal the sweeper and wait for it to stop.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let handle = self.sweeper_handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Retention sweeper task failed");
            }
        }

        info!("Shutdown complete");
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn service(&self) -> Arc<RelayService<T>> {
        Arc::clone(&self.service)
    }

    pub fn store(&self) -> Arc<JsonFileStore> {
        Arc::clone(&self.store)
    }

    pub fn sweeper(&self) -> Arc<RetentionSweeper<JsonFileStore>> {
        Arc::clone(&self.sweeper)
    }
}
