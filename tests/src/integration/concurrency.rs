//! # Concurrency
//!
//! Transitions that interleave on a multi-threaded runtime must not lose each
//! other's records, and a second process must not open a table in use.

use std::sync::Arc;

use cr_02_mapping_store::{JsonFileStore, LockError, MappingStore, StoreConfig, StoreError};
use cr_03_propagation::PropagationApi;
use cr_04_retention::{RetentionConfig, RetentionSweeper};
use shared_types::{FanoutRecord, MessageContent, OriginId, TargetMap};
use tempfile::TempDir;
use tokio::task::JoinSet;

use super::*;

const NOW: u64 = 1_700_000_000;
const DAY: u64 = 86_400;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishes_keep_every_record() {
    const POSTS: i64 = 32;

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("mapping.json"));
    let service = Arc::new(service(
        Arc::clone(&store),
        Arc::new(ScriptedTransport::new()),
    ));

    let mut tasks = JoinSet::new();
    for message_id in 1..=POSTS {
        let service = Arc::clone(&service);
        tasks.spawn(async move {
            service
                .publish(message_id, &MessageContent::text("damas toshkent"))
                .await
        });
    }
    while let Some(done) = tasks.join_next().await {
        assert!(done.unwrap().unwrap().recorded);
    }

    let table = store.get_all().unwrap();
    assert_eq!(table.len(), POSTS as usize);
    assert!(table.values().all(|record| record.targets().len() == 3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_publishes_survive_concurrent_sweeps() {
    const POSTS: i64 = 16;

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("mapping.json"));
    for id in 0..POSTS {
        store
            .upsert(
                OriginId::from(9_000_000 + id),
                FanoutRecord::flat(TargetMap::from([(C1, id)]), NOW - 60 * DAY),
            )
            .unwrap();
    }
    let service = Arc::new(service(
        Arc::clone(&store),
        Arc::new(ScriptedTransport::new()),
    ));
    let sweeper = Arc::new(RetentionSweeper::new(
        Arc::clone(&store),
        RetentionConfig::default(),
    ));

    let mut tasks = JoinSet::new();
    for message_id in 1..=POSTS {
        let service = Arc::clone(&service);
        tasks.spawn(async move {
            service
                .publish(message_id, &MessageContent::text("damas"))
                .await
                .map(|report| report.recorded)
                .unwrap_or(false)
        });
    }
    let sweep = {
        let sweeper = Arc::clone(&sweeper);
        tokio::task::spawn_blocking(move || sweeper.sweep_once(NOW))
    };

    while let Some(done) = tasks.join_next().await {
        assert!(done.unwrap());
    }
    sweep.await.unwrap().unwrap();

    // Fresh posts carry the wall-clock time, far past the fixed sweep time.
    let table = store.get_all().unwrap();
    assert_eq!(table.len(), POSTS as usize);
    assert!((1..=POSTS).all(|id| table.contains_key(&OriginId::from(id))));
}

#[test]
fn test_second_store_on_same_table_is_locked_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    let config = StoreConfig {
        path: path.clone(),
        backup: true,
        process_lock: true,
    };

    let first = JsonFileStore::open(config.clone()).unwrap();
    match JsonFileStore::open(config.clone()) {
        Err(StoreError::Lock(LockError::AlreadyLocked { path: held, .. })) => {
            assert!(held.starts_with(dir.path()));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("second store opened while the first holds the lock"),
    }

    drop(first);
    assert!(JsonFileStore::open(config).is_ok());
}
