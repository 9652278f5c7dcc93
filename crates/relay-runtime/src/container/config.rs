//! # Relay Configuration
//!
//! Unified configuration for the relay subsystems, loaded from `RELAY_*`
//! environment variables on top of defaults.
//!
//! ## Required
//!
//! - `RELAY_ORIGIN_CHANNEL`: channel the relay copies from
//! - `RELAY_OWNER_ID`: actor that is always authorized
//!
//! Optional values that fail to parse are logged and the default is kept.

use cr_03_propagation::PropagationConfig;
use cr_04_retention::RetentionConfig;
use shared_types::{ActorId, ChannelId};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const ORIGIN_CHANNEL_VAR: &str = "RELAY_ORIGIN_CHANNEL";
pub const OWNER_ID_VAR: &str = "RELAY_OWNER_ID";
pub const DATA_DIR_VAR: &str = "RELAY_DATA_DIR";
pub const ALWAYS_SEND_VAR: &str = "RELAY_ALWAYS_SEND";
pub const RETENTION_DAYS_VAR: &str = "RELAY_RETENTION_DAYS";
pub const SWEEP_INTERVAL_VAR: &str = "RELAY_SWEEP_INTERVAL_SECS";
pub const EDIT_DELAY_VAR: &str = "RELAY_EDIT_DELAY_MS";
pub const REPLY_RETRY_VAR: &str = "RELAY_REPLY_RETRY_MS";
pub const STORE_BACKUP_VAR: &str = "RELAY_STORE_BACKUP";

/// Complete relay configuration.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub storage: StorageConfig,
    pub routing: RoutingSeed,
    pub propagation: PropagationConfig,
    pub retention: RetentionConfig,
    pub access: AccessConfig,
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must not be zero")]
    Zero(&'static str),
}

impl RelayConfig {
    /// Load from the process environment and validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup and validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = RelayConfig::default();

        config.propagation.origin_channel = required(&lookup, ORIGIN_CHANNEL_VAR)?;
        config.access.owner_id = required(&lookup, OWNER_ID_VAR)?;

        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            config.storage.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(backup) = optional_with(&lookup, STORE_BACKUP_VAR, parse_bool) {
            config.storage.backup = backup;
        }
        if let Some(raw) = lookup(ALWAYS_SEND_VAR) {
            config.routing.always_send = parse_channel_list(&raw);
        }
        if let Some(horizon) = optional_with(&lookup, RETENTION_DAYS_VAR, parse_days) {
            config.retention.horizon = horizon;
        }
        if let Some(secs) = optional::<u64, _>(&lookup, SWEEP_INTERVAL_VAR) {
            config.retention.interval = Duration::from_secs(secs);
        }
        if let Some(ms) = optional::<u64, _>(&lookup, EDIT_DELAY_VAR) {
            config.propagation.edit_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = optional::<u64, _>(&lookup, REPLY_RETRY_VAR) {
            config.propagation.reply_retry_delay = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the relay cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.propagation.origin_channel == 0 {
            return Err(ConfigError::Zero(ORIGIN_CHANNEL_VAR));
        }
        if self.access.owner_id == 0 {
            return Err(ConfigError::Zero(OWNER_ID_VAR));
        }
        if self.retention.horizon.is_zero() {
            return Err(ConfigError::Zero(RETENTION_DAYS_VAR));
        }
        if self.retention.interval.is_zero() {
            return Err(ConfigError::Zero(SWEEP_INTERVAL_VAR));
        }
        Ok(())
    }
}

/// Where the relay keeps its documents.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Keep a `.backup` copy of the mapping document.
    pub backup: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            backup: true,
        }
    }
}

impl StorageConfig {
    /// Fan-out table.
    pub fn mapping_path(&self) -> PathBuf {
        self.data_dir.join("mapping.json")
    }

    /// Routing configuration.
    pub fn routing_path(&self) -> PathBuf {
        self.data_dir.join("admin_config.json")
    }

    pub fn product_keywords_path(&self) -> PathBuf {
        self.data_dir.join("model_keywords.json")
    }

    pub fn region_keywords_path(&self) -> PathBuf {
        self.data_dir.join("region_keywords.json")
    }

    /// Custom admin list.
    pub fn admins_path(&self) -> PathBuf {
        self.data_dir.join("admin_users.json")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Values written into the routing document the first time it is created.
#[derive(Debug, Clone, Default)]
pub struct RoutingSeed {
    pub always_send: BTreeSet<ChannelId>,
}

/// Authorization settings.
#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    /// Always authorized, whatever the admin document says.
    pub owner_id: ActorId,
}

fn required<T, F>(lookup: &F, name: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name).ok_or(ConfigError::Missing(name))?;
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.clone(),
    })
}

fn optional<T, F>(lookup: &F, name: &'static str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    optional_with(lookup, name, |raw| raw.parse().ok())
}

fn optional_with<T, F, P>(lookup: &F, name: &'static str, parse: P) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let raw = lookup(name)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!(var = name, value = %raw, "Ignoring malformed setting, keeping default");
    }
    parsed
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Whole days as a horizon; a count whose seconds overflow is malformed.
fn parse_days(raw: &str) -> Option<Duration> {
    RetentionConfig::horizon_from_days(raw.parse().ok()?)
}

/// Comma-separated channel ids; malformed and zero entries are dropped.
fn parse_channel_list(raw: &str) -> BTreeSet<ChannelId> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.parse::<ChannelId>() {
            Ok(0) => None,
            Ok(id) => Some(id),
            Err(_) => {
                warn!(var = ALWAYS_SEND_VAR, entry = part, "Ignoring malformed channel id");
                None
            }
        })
        .collect()
}
