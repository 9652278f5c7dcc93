//! # Retention Sweeper Service
//!
//! A long-running task that sleeps for one interval, sweeps, and repeats
//! until shutdown is signalled over a `watch` channel.

use cr_02_mapping_store::{MappingStore, StoreError};
use shared_types::{SystemTimeSource, TimeSource, Timestamp};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::{select_expired, RetentionConfig, SweepReport};

/// Periodic eviction of expired fan-out records.
pub struct RetentionSweeper<S: MappingStore> {
    store: Arc<S>,
    config: RetentionConfig,
    clock: Arc<dyn TimeSource>,
}

impl<S: MappingStore + 'static> RetentionSweeper<S> {
    pub fn new(store: Arc<S>, config: RetentionConfig) -> Self {
        Self {
            store,
            config,
            clock: Arc::new(SystemTimeSource),
        }
    }

    /// Replace the clock used to compute the cutoff.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RetentionConfig {
        &self.config
    }

    /// Evict every record older than the horizon as of `now`.
    ///
    /// The expired keys are computed from one read; the removal re-reads the
    /// table inside the store, so records written in between are kept.
    pub fn sweep_once(&self, now: Timestamp) -> Result<SweepReport, StoreError> {
        sweep(self.store.as_ref(), &self.config, now)
    }

    /// Sweep at the clock's current time on the blocking pool and log the
    /// outcome.
    pub async fn sweep_now(&self) -> Option<SweepReport> {
        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        let now = self.clock.now();

        match tokio::task::spawn_blocking(move || sweep(store.as_ref(), &config, now)).await {
            Ok(Ok(report)) => {
                info!(
                    before = report.before,
                    evicted = report.evicted,
                    after = report.after,
                    file_bytes = report.file_bytes,
                    "Retention sweep complete"
                );
                Some(report)
            }
            Ok(Err(e)) => {
                error!(error = %e, "Retention sweep failed, retrying next interval");
                None
            }
            Err(e) => {
                error!(error = %e, "Retention sweep task aborted, retrying next interval");
                None
            }
        }
    }

    /// Sweep once per interval until `shutdown` flips to `true` or its
    /// sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            horizon_days = self.config.horizon.as_secs() / 86_400,
            "Retention sweeper started"
        );

        while !*shutdown.borrow() {
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {
                    debug!("Retention interval elapsed");
                    self.sweep_now().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Retention sweeper stopped");
    }

    /// Run the sweeper on its own task.
    pub fn spawn(self: Arc<Self>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}

/// One sweep over `store`. The file size is informational: failing to read
/// it after the eviction is saved does not fail the sweep.
fn sweep<S: MappingStore>(
    store: &S,
    config: &RetentionConfig,
    now: Timestamp,
) -> Result<SweepReport, StoreError> {
    let table = store.get_all()?;
    let expired = select_expired(&table, now, config);

    let mut report = SweepReport {
        cutoff: config.cutoff(now),
        before: table.len(),
        after: table.len(),
        ..Default::default()
    };

    if !expired.is_empty() {
        let outcome = store.remove_many(&expired)?;
        report.evicted = outcome.removed;
        report.after = outcome.remaining;
    }
    report.file_bytes = match store.stats() {
        Ok(stats) => stats.file_bytes,
        Err(e) => {
            warn!(error = %e, evicted = report.evicted, "Could not read mapping file size after sweep");
            0
        }
    };

    Ok(report)
}
