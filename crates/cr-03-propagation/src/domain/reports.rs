//! Per-transition reports.
//!
//! Counts, not errors: a report is returned even when every remote call
//! failed.

use cr_01_routing::Classification;
use shared_types::{ChannelId, OriginId, TargetMap};
use std::collections::BTreeSet;

/// Result of fanning out a new post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub origin: OriginId,
    pub classification: Classification,
    /// Target set computed by the resolver.
    pub resolved: BTreeSet<ChannelId>,
    /// Copies that succeeded.
    pub copied: TargetMap,
    /// Targets whose copy failed.
    pub failed: Vec<ChannelId>,
    /// Whether a fan-out record was written.
    pub recorded: bool,
}

/// Result of fanning out a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyReport {
    pub origin: OriginId,
    pub reply_to: OriginId,
    /// Whether the parent's record was found.
    pub parent_found: bool,
    pub copied: TargetMap,
    pub failed: Vec<ChannelId>,
    pub recorded: bool,
}

/// Result of mirroring an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditReport {
    pub origin: OriginId,
    pub found: bool,
    /// Copies edited successfully.
    pub edited: usize,
    /// Copies whose edit call failed.
    pub failed: usize,
    /// Copies skipped because the content type cannot be edited.
    pub unsupported: usize,
}

impl EditReport {
    /// Remote edit calls issued.
    pub fn attempted(&self) -> usize {
        self.edited + self.failed
    }
}

/// Result of deleting an origin message and its copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub origin: OriginId,
    pub found: bool,
    /// Successful deletions, origin message included.
    pub deleted: usize,
    /// Failed deletions, origin message included.
    pub failed: usize,
    pub origin_deleted: bool,
    /// Whether the record was removed from the table.
    pub removed: bool,
}

/// Answer to a forwarded origin message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteRequest {
    /// The forwarding actor may not delete.
    Unauthorized,
    /// No copies are recorded for the message.
    NotFound,
    /// Copies exist; deletion waits for confirmation.
    Confirm {
        origin: OriginId,
        reply_to: Option<OriginId>,
    },
}
