//! # Record Codec
//!
//! On-disk shapes of a fan-out record.
//!
//! ## Compact (written)
//!
//! ```text
//! flat:  {"c": {"<channel>": <copy>, ...}, "t": <unix secs>}
//! reply: {"r": "<origin>", "c": {...}, "t": <unix secs>}
//! ```
//!
//! ## Legacy (read only)
//!
//! ```text
//! flat:  {"<channel>": <copy>, ..., "_timestamp": <unix secs>}
//! reply: {"reply_to": "<origin>", "targets": {...}}
//! ```
//!
//! Both decode into the same [`FanoutRecord`]. A timestamp of `0` means
//! "unknown" and decodes to `None`; `None` is encoded by omitting `t`.

use serde::Serialize;
use serde_json::{Map, Value};
use shared_types::{FanoutRecord, FanoutTable, MessageId, OriginId, TargetMap};
use std::collections::BTreeMap;

/// Keys of a legacy flat record that are metadata, not channel ids.
pub const META_KEYS: &[&str] = &["_timestamp", "t", "reply_to", "targets", "_forwarded"];

#[derive(Serialize)]
struct CompactRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    r: Option<&'a OriginId>,
    c: &'a TargetMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    t: Option<u64>,
}

impl<'a> From<&'a FanoutRecord> for CompactRecord<'a> {
    fn from(record: &'a FanoutRecord) -> Self {
        Self {
            r: record.reply_to(),
            c: record.targets(),
            t: record.created_at().filter(|t| *t > 0),
        }
    }
}

/// Encode the whole table as a compact JSON document.
pub fn encode_table(table: &FanoutTable) -> Result<Vec<u8>, serde_json::Error> {
    let compact: BTreeMap<&OriginId, CompactRecord<'_>> = table
        .iter()
        .map(|(id, record)| (id, CompactRecord::from(record)))
        .collect();
    serde_json::to_vec(&compact)
}

/// Encode one record in compact form.
pub fn encode_record(record: &FanoutRecord) -> Value {
    // Serializing a map of integer keys and optional scalars cannot fail.
    serde_json::to_value(CompactRecord::from(record)).unwrap_or(Value::Null)
}

/// Result of decoding a whole document.
#[derive(Debug, Default)]
pub struct DecodedTable {
    pub table: FanoutTable,
    /// Keys whose value matched no known record shape.
    pub skipped: Vec<String>,
}

/// Decode a whole document. Fails only when the bytes are not a JSON object.
pub fn decode_table(bytes: &[u8]) -> Result<DecodedTable, serde_json::Error> {
    let document: Map<String, Value> = serde_json::from_slice(bytes)?;
    let mut decoded = DecodedTable::default();
    for (key, value) in document {
        match decode_record(&value) {
            Some(record) => {
                decoded.table.insert(OriginId::new(key), record);
            }
            None => decoded.skipped.push(key),
        }
    }
    Ok(decoded)
}

/// Decode one record from any supported shape.
pub fn decode_record(value: &Value) -> Option<FanoutRecord> {
    let object = value.as_object()?;

    if let Some(channels) = object.get("c").and_then(Value::as_object) {
        let targets = decode_targets(channels);
        let created_at = object.get("t").and_then(decode_timestamp);
        return Some(match object.get("r") {
            Some(parent) => FanoutRecord::Reply {
                reply_to: decode_origin(parent)?,
                targets,
                created_at,
            },
            None => FanoutRecord::Flat {
                targets,
                created_at,
            },
        });
    }

    if let Some(parent) = object.get("reply_to") {
        let targets = object
            .get("targets")
            .and_then(Value::as_object)
            .map(decode_targets)
            .unwrap_or_default();
        return Some(FanoutRecord::Reply {
            reply_to: decode_origin(parent)?,
            targets,
            created_at: object.get("_timestamp").and_then(decode_timestamp),
        });
    }

    Some(FanoutRecord::Flat {
        targets: decode_targets(object),
        created_at: object
            .get("_timestamp")
            .or_else(|| object.get("t"))
            .and_then(decode_timestamp),
    })
}

fn decode_targets(object: &Map<String, Value>) -> TargetMap {
    object
        .iter()
        .filter(|(key, _)| !META_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| Some((key.trim().parse().ok()?, decode_message_id(value)?)))
        .collect()
}

fn decode_message_id(value: &Value) -> Option<MessageId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decode_origin(value: &Value) -> Option<OriginId> {
    match value {
        Value::String(s) => Some(OriginId::new(s.clone())),
        Value::Number(n) => n.as_i64().map(OriginId::from),
        _ => None,
    }
}

fn decode_timestamp(value: &Value) -> Option<u64> {
    let secs = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (secs > 0).then_some(secs)
}
