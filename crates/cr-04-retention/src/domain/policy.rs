//! Retention policy.

use shared_types::{FanoutRecord, FanoutTable, MessageId, OriginId, Timestamp};
use std::time::Duration;

const DAY: u64 = 24 * 60 * 60;

/// Retention policy knobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetentionConfig {
    /// Records older than this are evicted.
    pub horizon: Duration,
    /// Pause between sweeps. The first sweep runs one interval after start.
    pub interval: Duration,
    /// Origin ids below this, on records without a timestamp, are treated as
    /// older than the horizon.
    pub legacy_id_floor: MessageId,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            horizon: Duration::from_secs(45 * DAY),
            interval: Duration::from_secs(DAY),
            legacy_id_floor: 1_000_000,
        }
    }
}

impl RetentionConfig {
    /// Horizon of `days` days, or `None` if that many seconds overflow.
    pub fn horizon_from_days(days: u64) -> Option<Duration> {
        days.checked_mul(DAY).map(Duration::from_secs)
    }

    /// Replace the horizon. An overflowing day count leaves it unchanged.
    pub fn with_horizon_days(mut self, days: u64) -> Self {
        if let Some(horizon) = Self::horizon_from_days(days) {
            self.horizon = horizon;
        }
        self
    }

    /// Oldest creation time that survives a sweep at `now`.
    pub fn cutoff(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub(self.horizon.as_secs())
    }
}

/// Creation time to judge a record by: its own timestamp when present,
/// otherwise [`legacy_timestamp_estimate`].
pub fn effective_timestamp(
    id: &OriginId,
    record: &FanoutRecord,
    now: Timestamp,
    config: &RetentionConfig,
) -> Timestamp {
    match record.created_at().filter(|t| *t > 0) {
        Some(created_at) => created_at,
        None => legacy_timestamp_estimate(id, now, config),
    }
}

/// Age guess for records written before timestamps existed.
///
/// Numeric ids below the floor come from the channel's early life and are
/// placed just past the cutoff; larger ids are assumed recent. Non-numeric
/// keys are placed past the cutoff. This is an approximation: in a young
/// channel, recent posts have small ids too and get evicted early.
pub fn legacy_timestamp_estimate(
    id: &OriginId,
    now: Timestamp,
    config: &RetentionConfig,
) -> Timestamp {
    let expired = config.cutoff(now).saturating_sub(1);
    match id.as_message_id() {
        Some(message) if message >= config.legacy_id_floor => now,
        _ => expired,
    }
}

/// Keys whose effective timestamp is before the cutoff.
pub fn select_expired(
    table: &FanoutTable,
    now: Timestamp,
    config: &RetentionConfig,
) -> Vec<OriginId> {
    let cutoff = config.cutoff(now);
    table
        .iter()
        .filter(|(id, record)| effective_timestamp(id, record, now, config) < cutoff)
        .map(|(id, _)| id.clone())
        .collect()
}
