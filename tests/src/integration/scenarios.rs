//! # Transition Scenarios
//!
//! Each transition against the real JSON mapping document, with a scripted
//! transport standing in for the platform.
//!
//! ## Flows Tested:
//!
//! 1. **Publish**: partial fan-out records only the copies that succeeded
//! 2. **Reply**: missing parent means no remote calls and no record
//! 3. **Edit**: caption-only edit on a reply record hits every copy
//! 4. **Delete**: per-copy failures still remove the record
//! 5. **Legacy document**: mixed shapes load, next save is compact
//! 6. **Retention**: sweep over the file store evicts only expired records
//! 7. **Runtime**: owner forward, confirm and delete through `RelayRuntime`

use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;

use cr_02_mapping_store::{decode_table, MappingStore};
use cr_03_propagation::{DeleteRequest, OriginEvent, PropagationApi, TransitionOutcome};
use cr_04_retention::{RetentionConfig, RetentionSweeper};
use relay_runtime::adapters::DryRunTransport;
use relay_runtime::container::{RelayConfig, StorageConfig};
use relay_runtime::RelayRuntime;
use shared_types::{FanoutRecord, Media, MessageContent, OriginId, TargetMap};
use tempfile::TempDir;

use super::*;

const DAY: u64 = 86_400;
const NOW: u64 = 1_700_000_000;

// =============================================================================
// TEST FIXTURES
// =============================================================================

struct Fixture {
    _dir: TempDir,
    path: std::path::PathBuf,
    store: Arc<cr_02_mapping_store::JsonFileStore>,
    transport: Arc<ScriptedTransport>,
    service: FileBackedService,
}

fn fixture(transport: ScriptedTransport) -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    let store = open_store(&path);
    let transport = Arc::new(transport);
    let service = service(Arc::clone(&store), Arc::clone(&transport));
    Fixture {
        _dir: dir,
        path,
        store,
        transport,
        service,
    }
}

fn read_document(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

// =============================================================================
// PUBLISH / REPLY / EDIT / DELETE
// =============================================================================

#[tokio::test]
async fn test_publish_records_only_successful_copies() {
    let fx = fixture(ScriptedTransport::failing(&[C2]));

    let report = fx
        .service
        .publish(10, &MessageContent::text("damas car for sale"))
        .await
        .unwrap();

    assert_eq!(report.classification.product.as_deref(), Some("damas"));
    assert_eq!(report.resolved, BTreeSet::from([C1, C2]));
    assert_eq!(report.failed, vec![C2]);
    assert!(report.recorded);

    let record = fx.store.get(&OriginId::from(10)).unwrap().unwrap();
    assert!(!record.is_reply());
    assert_eq!(record.targets().len(), 1);
    assert_eq!(
        record.targets().keys().copied().collect::<Vec<_>>(),
        vec![C1]
    );

    let document = read_document(&fx.path);
    assert_eq!(document["10"]["c"].as_object().unwrap().len(), 1);
    assert!(document["10"]["t"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_publish_with_no_successful_copy_records_nothing() {
    let fx = fixture(ScriptedTransport::failing(&[C1, C2, C3]));

    let report = fx
        .service
        .publish(11, &MessageContent::text("damas toshkent"))
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 3);
    assert!(!report.recorded);
    assert!(fx.store.get_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_reply_to_unknown_parent_is_a_no_op() {
    let fx = fixture(ScriptedTransport::new());

    let report = fx.service.propagate_reply(21, 999).await.unwrap();

    assert!(!report.parent_found);
    assert!(fx.transport.calls().is_empty());
    assert!(fx.store.get_all().unwrap().is_empty());
    assert!(!fx.path.exists());
}

#[tokio::test]
async fn test_reply_threads_under_each_parent_copy() {
    let fx = fixture(ScriptedTransport::new());
    fx.store
        .upsert(
            OriginId::from(20),
            FanoutRecord::flat(TargetMap::from([(C1, 100), (C2, 200)]), NOW),
        )
        .unwrap();

    let report = fx.service.propagate_reply(21, 20).await.unwrap();

    assert!(report.parent_found);
    assert_eq!(
        fx.transport.calls(),
        vec![
            Call::Copy {
                target: C2,
                message: 21,
                reply_to: Some(200),
            },
            Call::Copy {
                target: C1,
                message: 21,
                reply_to: Some(100),
            },
        ]
    );
    let record = fx.store.get(&OriginId::from(21)).unwrap().unwrap();
    assert_eq!(record.reply_to(), Some(&OriginId::from(20)));
    assert_eq!(read_document(&fx.path)["21"]["r"], "20");
}

#[tokio::test]
async fn test_caption_edit_on_reply_record() {
    let fx = fixture(ScriptedTransport::new());
    fx.store
        .upsert(
            OriginId::from(30),
            FanoutRecord::reply(
                OriginId::from(29),
                TargetMap::from([(C1, 100), (C2, 200)]),
                NOW,
            ),
        )
        .unwrap();

    let content = MessageContent {
        caption: Some("narxi tushdi".into()),
        ..Default::default()
    };
    let report = fx.service.propagate_edit(30, &content).await.unwrap();

    assert_eq!(report.edited, 2);
    assert_eq!(report.attempted(), 2);
    let mut calls = fx.transport.calls();
    calls.sort_by_key(|call| format!("{call:?}"));
    assert_eq!(
        calls,
        vec![Call::EditCaption(C1, 100), Call::EditCaption(C2, 200)]
    );
}

#[tokio::test]
async fn test_edit_attempts_every_copy_despite_failures() {
    let fx = fixture(ScriptedTransport::failing(&[C1, C3]));
    fx.store
        .upsert(
            OriginId::from(31),
            FanoutRecord::flat(TargetMap::from([(C1, 101), (C2, 201), (C3, 301)]), NOW),
        )
        .unwrap();

    let content = MessageContent::media(
        Media::Photo {
            file_id: "AgAD".into(),
        },
        Some("yangi rasm".into()),
    );
    let report = fx.service.propagate_edit(31, &content).await.unwrap();

    assert_eq!(report.attempted(), 3);
    assert_eq!(report.edited, 1);
    assert_eq!(report.failed, 2);
    assert!(fx
        .transport
        .calls()
        .iter()
        .all(|call| matches!(call, Call::EditMedia(..))));
}

#[tokio::test]
async fn test_delete_removes_record_despite_copy_failure() {
    let fx = fixture(ScriptedTransport::failing(&[C1]));
    fx.store
        .upsert(
            OriginId::from(40),
            FanoutRecord::flat(TargetMap::from([(C1, 100), (C2, 200)]), NOW),
        )
        .unwrap();

    let report = fx.service.delete(&OriginId::from(40)).await.unwrap();

    assert!(report.found);
    assert!(report.origin_deleted);
    assert_eq!(report.deleted, 2);
    assert_eq!(report.failed, 1);
    assert!(report.removed);
    assert!(fx.transport.calls().contains(&Call::Delete(ORIGIN, 40)));
    assert!(fx.store.get(&OriginId::from(40)).unwrap().is_none());
    assert_eq!(read_document(&fx.path), serde_json::json!({}));
}

#[tokio::test]
async fn test_forward_and_confirm_by_admin() {
    let fx = fixture(ScriptedTransport::new());
    fx.store
        .upsert(
            OriginId::from(50),
            FanoutRecord::reply(OriginId::from(49), TargetMap::from([(C1, 100)]), NOW),
        )
        .unwrap();

    let outsider = fx.service.request_delete(7, 50).await.unwrap();
    assert_eq!(outsider, DeleteRequest::Unauthorized);
    assert!(fx.service.confirm_delete(7, &OriginId::from(50)).await.is_err());
    assert!(fx.transport.calls().is_empty());

    let request = fx.service.request_delete(ADMIN, 50).await.unwrap();
    assert_eq!(
        request,
        DeleteRequest::Confirm {
            origin: OriginId::from(50),
            reply_to: Some(OriginId::from(49)),
        }
    );

    let report = fx
        .service
        .confirm_delete(ADMIN, &OriginId::from(50))
        .await
        .unwrap();
    assert_eq!(report.deleted, 2);
    assert_eq!(
        fx.service.request_delete(ADMIN, 50).await.unwrap(),
        DeleteRequest::NotFound
    );
}

// =============================================================================
// LEGACY DOCUMENTS
// =============================================================================

#[tokio::test]
async fn test_legacy_document_is_rewritten_compact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    fs::write(
        &path,
        r#"{
            "5": {"-1001": 100, "-1002": "200", "_timestamp": 1699990000},
            "6": {"reply_to": "5", "targets": {"-1001": 101}},
            "7": {"c": {"-1003": 102}, "t": 1699999000},
            "8": "not a record"
        }"#,
    )
    .unwrap();
    let store = open_store(&path);
    let transport = Arc::new(ScriptedTransport::new());
    let service = service(Arc::clone(&store), Arc::clone(&transport));

    let table = store.get_all().unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table[&OriginId::from(5)],
        FanoutRecord::Flat {
            targets: TargetMap::from([(C1, 100), (C2, 200)]),
            created_at: Some(1_699_990_000),
        }
    );
    assert_eq!(table[&OriginId::from(6)].reply_to(), Some(&OriginId::from(5)));
    assert_eq!(table[&OriginId::from(6)].created_at(), None);

    let report = service
        .propagate_edit(6, &MessageContent::text("tahrir"))
        .await
        .unwrap();
    assert_eq!(report.edited, 1);
    assert_eq!(transport.calls(), vec![Call::EditText(C1, 101)]);

    service
        .publish(9, &MessageContent::text("yangi e'lon"))
        .await
        .unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("_timestamp"));
    assert!(!raw.contains("targets"));
    assert!(!raw.contains("not a record"));
    let reloaded = decode_table(raw.as_bytes()).unwrap().table;
    assert_eq!(reloaded.len(), 4);
    assert_eq!(reloaded[&OriginId::from(5)], table[&OriginId::from(5)]);
    assert!(dir.path().join("mapping.json.backup").exists());
}

#[tokio::test]
async fn test_corrupt_document_reads_empty_and_recovers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    fs::write(&path, "{\"10\": {\"c\": ").unwrap();
    let store = open_store(&path);
    let service = service(Arc::clone(&store), Arc::new(ScriptedTransport::new()));

    assert!(store.get_all().unwrap().is_empty());

    let report = service
        .publish(12, &MessageContent::text("damas"))
        .await
        .unwrap();
    assert!(report.recorded);
    assert_eq!(store.get_all().unwrap().len(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("mapping.json.backup")).unwrap(),
        "{\"10\": {\"c\": "
    );
}

// =============================================================================
// RETENTION
// =============================================================================

#[test]
fn test_sweep_over_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    let store = open_store(&path);
    store
        .upsert(
            OriginId::from(5_000_001),
            FanoutRecord::flat(TargetMap::from([(C1, 1)]), NOW - 50 * DAY),
        )
        .unwrap();
    store
        .upsert(
            OriginId::from(5_000_002),
            FanoutRecord::flat(TargetMap::from([(C1, 2)]), NOW - 10 * DAY),
        )
        .unwrap();
    store
        .upsert(
            OriginId::from(12),
            FanoutRecord::Flat {
                targets: TargetMap::from([(C1, 3)]),
                created_at: None,
            },
        )
        .unwrap();

    let sweeper = RetentionSweeper::new(Arc::clone(&store), RetentionConfig::default());
    let report = sweeper.sweep_once(NOW).unwrap();

    assert_eq!(report.before, 3);
    assert_eq!(report.evicted, 2);
    assert_eq!(report.after, 1);
    assert_eq!(report.file_bytes, fs::metadata(&path).unwrap().len());

    let document = read_document(&path);
    assert_eq!(
        document.as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["5000002"]
    );
}

// =============================================================================
// RUNTIME
// =============================================================================

#[tokio::test]
async fn test_runtime_lifecycle_with_dry_run_transport() {
    const OWNER: i64 = 777;

    let dir = TempDir::new().unwrap();
    let mut config = RelayConfig {
        storage: StorageConfig {
            data_dir: dir.path().to_path_buf(),
            backup: true,
        },
        ..Default::default()
    };
    config.propagation.origin_channel = ORIGIN;
    config.propagation.edit_delay = std::time::Duration::ZERO;
    config.access.owner_id = OWNER;
    config.routing.always_send = BTreeSet::from([C2]);

    let transport = Arc::new(DryRunTransport::starting_at(900));
    let runtime = RelayRuntime::new(config, Arc::clone(&transport)).unwrap();
    runtime.start();

    let events = [
        OriginEvent::Post {
            message_id: 60,
            content: MessageContent::text("Spark sotiladi"),
        },
        OriginEvent::Reply {
            message_id: 61,
            reply_to: 60,
        },
        OriginEvent::Edit {
            message_id: 60,
            content: MessageContent::text("Spark sotildi"),
        },
    ];
    for event in events {
        runtime.dispatch(event).await.unwrap();
    }
    assert_eq!(runtime.store().stats().unwrap().entries, 2);

    let outcome = runtime
        .dispatch(OriginEvent::ConfirmDelete {
            actor: OWNER,
            origin: OriginId::from(61),
        })
        .await
        .unwrap();
    let TransitionOutcome::Deleted(report) = outcome else {
        panic!("expected delete");
    };
    assert_eq!(report.deleted, 2);
    assert_eq!(runtime.store().stats().unwrap().entries, 1);

    // copy, reply copy, edit, reply-copy delete, origin delete
    assert_eq!(transport.calls(), 5);

    runtime.shutdown().await;
}
