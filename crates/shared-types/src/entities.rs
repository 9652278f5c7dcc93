//! # Core Domain Entities
//!
//! Identifiers, fan-out records and the message content model shared by the
//! routing, storage, propagation and retention subsystems.
//!
//! ## Clusters
//!
//! - **Identity**: `ChannelId`, `MessageId`, `OriginId`
//! - **Linkage**: `TargetMap`, `FanoutRecord`
//! - **Content**: `MessageContent`, `Media`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Platform identifier of a channel (channel ids are negative).
pub type ChannelId = i64;

/// Platform identifier of a message inside one channel.
pub type MessageId = i64;

/// Identifier of an actor (user) issuing privileged requests.
pub type ActorId = i64;

/// Identifier of a message in the origin channel.
///
/// Serialized as a string because it is the key of the persisted fan-out
/// table. Keys written by older releases are not guaranteed to be numeric.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(String);

impl OriginId {
    /// Wrap a raw table key.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw table key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric message id, or `None` for keys that are not plain integers.
    pub fn as_message_id(&self) -> Option<MessageId> {
        self.0.trim().parse().ok()
    }
}

impl From<MessageId> for OriginId {
    fn from(id: MessageId) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER B: LINKAGE
// =============================================================================

/// Copies produced by one fan-out: target channel -> copy message id.
pub type TargetMap = BTreeMap<ChannelId, MessageId>;

/// The full fan-out table keyed by origin message.
pub type FanoutTable = BTreeMap<OriginId, FanoutRecord>;

/// Correspondence between one origin message and its copies.
///
/// At most one record exists per [`OriginId`]. A `Reply` record's `reply_to`
/// may dangle once the parent has been evicted; readers treat that as
/// "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanoutRecord {
    /// Copies of a top-level post.
    Flat {
        /// Channel -> copy id.
        targets: TargetMap,
        /// Unix seconds at creation; `None` for legacy entries.
        created_at: Option<u64>,
    },
    /// Copies of a reply, each attached to the parent's copy in its channel.
    Reply {
        /// Origin message this one replies to.
        reply_to: OriginId,
        /// Channel -> copy id.
        targets: TargetMap,
        /// Unix seconds at creation; `None` for legacy entries.
        created_at: Option<u64>,
    },
}

impl FanoutRecord {
    /// Create a flat record stamped with `created_at`.
    pub fn flat(targets: TargetMap, created_at: u64) -> Self {
        FanoutRecord::Flat {
            targets,
            created_at: Some(created_at),
        }
    }

    /// Create a reply record stamped with `created_at`.
    pub fn reply(reply_to: OriginId, targets: TargetMap, created_at: u64) -> Self {
        FanoutRecord::Reply {
            reply_to,
            targets,
            created_at: Some(created_at),
        }
    }

    /// Channel -> copy id for every copy of this message.
    pub fn targets(&self) -> &TargetMap {
        match self {
            FanoutRecord::Flat { targets, .. } | FanoutRecord::Reply { targets, .. } => targets,
        }
    }

    /// Creation time, if known.
    pub fn created_at(&self) -> Option<u64> {
        match self {
            FanoutRecord::Flat { created_at, .. } | FanoutRecord::Reply { created_at, .. } => {
                *created_at
            }
        }
    }

    /// Parent origin id for reply records.
    pub fn reply_to(&self) -> Option<&OriginId> {
        match self {
            FanoutRecord::Flat { .. } => None,
            FanoutRecord::Reply { reply_to, .. } => Some(reply_to),
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, FanoutRecord::Reply { .. })
    }
}

// =============================================================================
// CLUSTER C: CONTENT
// =============================================================================

/// Media attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    Photo { file_id: String },
    Video { file_id: String },
    Document { file_id: String },
    /// Any media the relay cannot re-send through an edit (stickers, polls...).
    Other { name: String },
}

impl Media {
    /// Whether an edit can replace this media in place.
    pub fn is_editable(&self) -> bool {
        !matches!(self, Media::Other { .. })
    }
}

/// The user-visible content of an origin message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    /// Body of a text-only message.
    #[serde(default)]
    pub text: Option<String>,
    /// Caption of a media message.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub media: Option<Media>,
}

impl MessageContent {
    /// Text-only content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Media content with an optional caption.
    pub fn media(media: Media, caption: Option<String>) -> Self {
        Self {
            text: None,
            caption,
            media: Some(media),
        }
    }

    /// Text used for keyword classification: a non-empty body, else the
    /// caption, else empty.
    pub fn classification_text(&self) -> &str {
        self.text
            .as_deref()
            .filter(|text| !text.is_empty())
            .or(self.caption.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_id_numeric_roundtrip() {
        let id = OriginId::from(4521);
        assert_eq!(id.as_str(), "4521");
        assert_eq!(id.as_message_id(), Some(4521));
    }

    #[test]
    fn test_origin_id_non_numeric() {
        assert_eq!(OriginId::new("legacy-key").as_message_id(), None);
    }

    #[test]
    fn test_record_accessors() {
        let mut targets = TargetMap::new();
        targets.insert(-100, 7);
        let reply = FanoutRecord::reply(OriginId::from(1), targets.clone(), 99);
        assert!(reply.is_reply());
        assert_eq!(reply.reply_to(), Some(&OriginId::from(1)));
        assert_eq!(reply.created_at(), Some(99));

        let flat = FanoutRecord::flat(targets, 5);
        assert!(!flat.is_reply());
        assert_eq!(flat.targets().get(&-100), Some(&7));
    }

    #[test]
    fn test_classification_text_prefers_body() {
        let content = MessageContent {
            text: Some("body".into()),
            caption: Some("caption".into()),
            media: None,
        };
        assert_eq!(content.classification_text(), "body");

        let captioned = MessageContent::media(
            Media::Photo {
                file_id: "f".into(),
            },
            Some("caption".into()),
        );
        assert_eq!(captioned.classification_text(), "caption");
        assert_eq!(MessageContent::default().classification_text(), "");
    }

    #[test]
    fn test_classification_text_skips_empty_body() {
        let content = MessageContent {
            text: Some(String::new()),
            caption: Some("damas".into()),
            media: Some(Media::Photo {
                file_id: "f".into(),
            }),
        };
        assert_eq!(content.classification_text(), "damas");
    }

    #[test]
    fn test_content_deserializes_tagged_media() {
        let content: MessageContent = serde_json::from_str(
            r#"{"caption":"nexia 2019","media":{"kind":"video","file_id":"v1"}}"#,
        )
        .unwrap();
        assert_eq!(content.text, None);
        assert_eq!(
            content.media,
            Some(Media::Video {
                file_id: "v1".into()
            })
        );
    }
}
