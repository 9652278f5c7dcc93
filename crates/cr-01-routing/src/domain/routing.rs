//! Routing configuration and target resolution.

use serde::{Deserialize, Serialize};
use shared_types::ChannelId;
use std::collections::{BTreeMap, BTreeSet};

use super::{Axis, Classification};

/// Where posts go.
///
/// Field names on disk follow the admin document (`model_channels`,
/// `region_channels`, `always_send_to`, `channel_names`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Product category -> channels.
    #[serde(rename = "model_channels", default)]
    pub product_channels: BTreeMap<String, BTreeSet<ChannelId>>,
    /// Region category -> channels.
    #[serde(rename = "region_channels", default)]
    pub region_channels: BTreeMap<String, BTreeSet<ChannelId>>,
    /// Channels every post goes to.
    #[serde(rename = "always_send_to", default)]
    pub always_send: BTreeSet<ChannelId>,
    /// Display names for channels.
    #[serde(default)]
    pub channel_names: BTreeMap<ChannelId, String>,
}

impl RoutingConfig {
    /// Drop `0` channel ids, which mark unset channels.
    pub fn sanitized(mut self) -> Self {
        self.always_send.remove(&0);
        for channels in self
            .product_channels
            .values_mut()
            .chain(self.region_channels.values_mut())
        {
            channels.remove(&0);
        }
        self.channel_names.remove(&0);
        self
    }

    /// Channels mapped to `category` on `axis`.
    pub fn channels_for(&self, axis: Axis, category: &str) -> Option<&BTreeSet<ChannelId>> {
        match axis {
            Axis::Product => self.product_channels.get(category),
            Axis::Region => self.region_channels.get(category),
        }
    }

    /// Fan-out target set for a classified post.
    pub fn resolve(&self, classification: &Classification) -> BTreeSet<ChannelId> {
        resolve_targets(
            classification.product.as_deref(),
            classification.region.as_deref(),
            self,
        )
    }

    /// Every channel the configuration can route to.
    pub fn all_targets(&self) -> BTreeSet<ChannelId> {
        self.product_channels
            .values()
            .chain(self.region_channels.values())
            .flatten()
            .chain(self.always_send.iter())
            .copied()
            .collect()
    }

    /// Configured display name, or the numeric id.
    pub fn display_name(&self, channel: ChannelId) -> String {
        self.channel_names
            .get(&channel)
            .cloned()
            .unwrap_or_else(|| channel.to_string())
    }
}

/// Union of always-send channels and the channels of each matched, known
/// category. An empty result is valid: the post is not propagated.
pub fn resolve_targets(
    product: Option<&str>,
    region: Option<&str>,
    config: &RoutingConfig,
) -> BTreeSet<ChannelId> {
    let mut targets = config.always_send.clone();
    if let Some(channels) = product.and_then(|c| config.channels_for(Axis::Product, c)) {
        targets.extend(channels.iter().copied());
    }
    if let Some(channels) = region.and_then(|c| config.channels_for(Axis::Region, c)) {
        targets.extend(channels.iter().copied());
    }
    targets
}
