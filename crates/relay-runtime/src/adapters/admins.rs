//! Authorizer backed by the owner id and `admin_users.json`.

use async_trait::async_trait;
use cr_03_propagation::Authorizer;
use serde::{Deserialize, Serialize};
use shared_types::ActorId;
use std::path::PathBuf;
use tracing::debug;

use super::documents::load_or_init;

/// Contents of `admin_users.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUsers {
    /// Whether administrators of the origin channel count as admins. Needs a
    /// membership lookup on the platform, which the relay core does not do.
    #[serde(default = "enabled")]
    pub channel_admins: bool,
    #[serde(default)]
    pub custom_admins: Vec<ActorId>,
}

fn enabled() -> bool {
    true
}

impl Default for AdminUsers {
    fn default() -> Self {
        Self {
            channel_admins: true,
            custom_admins: Vec::new(),
        }
    }
}

/// Owner first, then the custom admin list, re-read on every check.
pub struct AdminRegistry {
    owner: ActorId,
    path: PathBuf,
}

impl AdminRegistry {
    pub fn new(owner: ActorId, path: impl Into<PathBuf>) -> Self {
        Self {
            owner,
            path: path.into(),
        }
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    pub fn users(&self) -> AdminUsers {
        load_or_init(&self.path, AdminUsers::default).0
    }
}

#[async_trait]
impl Authorizer for AdminRegistry {
    async fn is_authorized(&self, actor: ActorId) -> bool {
        if actor == self.owner {
            return true;
        }
        let allowed = self.users().custom_admins.contains(&actor);
        debug!(actor, allowed, "Admin check");
        allowed
    }
}
