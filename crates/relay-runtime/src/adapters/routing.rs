//! Routing source backed by the data-directory documents.

use cr_01_routing::{
    default_product_keywords, default_region_keywords, KeywordTable, RoutingConfig,
};
use cr_03_propagation::{RoutingSnapshot, RoutingSource};
use std::path::PathBuf;
use tracing::debug;

use super::documents::load_or_init;
use crate::container::{RoutingSeed, StorageConfig};

/// Reads `admin_config.json`, `model_keywords.json` and
/// `region_keywords.json` on every snapshot.
pub struct JsonRoutingSource {
    routing_path: PathBuf,
    products_path: PathBuf,
    regions_path: PathBuf,
    seed: RoutingSeed,
}

impl JsonRoutingSource {
    pub fn new(storage: &StorageConfig, seed: RoutingSeed) -> Self {
        Self {
            routing_path: storage.routing_path(),
            products_path: storage.product_keywords_path(),
            regions_path: storage.region_keywords_path(),
            seed,
        }
    }

    fn default_routing(&self) -> RoutingConfig {
        RoutingConfig {
            always_send: self.seed.always_send.clone(),
            ..Default::default()
        }
    }

    pub fn routing(&self) -> RoutingConfig {
        let (config, _) = load_or_init(&self.routing_path, || self.default_routing());
        config.sanitized()
    }

    pub fn products(&self) -> KeywordTable {
        load_or_init(&self.products_path, default_product_keywords).0
    }

    pub fn regions(&self) -> KeywordTable {
        load_or_init(&self.regions_path, default_region_keywords).0
    }
}

impl RoutingSource for JsonRoutingSource {
    fn snapshot(&self) -> RoutingSnapshot {
        let snapshot = RoutingSnapshot {
            config: self.routing(),
            products: self.products(),
            regions: self.regions(),
        };
        debug!(
            products = snapshot.products.len(),
            regions = snapshot.regions.len(),
            always_send = snapshot.config.always_send.len(),
            "Routing snapshot loaded"
        );
        snapshot
    }
}
