// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::{MemoryStore, StoreCall};
use std::time::Duration;

fn table(store: &MemoryStore) -> LockTable<MemoryStore> {
    LockTable::new(store.clone(), "locks", KeySchema::new("pk"))
}

fn key(id: &str) -> LockKey {
    LockKey {
        partition: id.into(),
        sort: None,
    }
}

fn record(id: &str, guid: &str, fencing_token: u64) -> LockRecord {
    LockRecord::new(key(id), "me", guid)
        .with_fencing_token(fencing_token)
        .with_lease_duration(Duration::from_secs(10))
}

#[tokio::test]
async fn put_if_absent_creates_once() {
    let store = MemoryStore::new();
    let table = table(&store);

    table.put_if_absent(&record("L1", "g1", 1)).await.unwrap();
    let err = table
        .put_if_absent(&record("L1", "g2", 1))
        .await
        .unwrap_err();

    assert!(err.is_conditional_check_failed());
    let stored = table.get(&key("L1")).await.unwrap().unwrap();
    assert_eq!(stored.identity_token, "g1");
}

#[tokio::test]
async fn put_if_absent_or_matches_checks_both_tokens() {
    let store = MemoryStore::new();
    let table = table(&store);
    table.put_if_absent(&record("L1", "g1", 5)).await.unwrap();

    let stale = table
        .put_if_absent_or_matches(&record("L1", "g2", 6), "g1", Some(4))
        .await
        .unwrap_err();
    assert!(stale.is_conditional_check_failed());

    table
        .put_if_absent_or_matches(&record("L1", "g2", 6), "g1", Some(5))
        .await
        .unwrap();
    let stored = table.get(&key("L1")).await.unwrap().unwrap();
    assert_eq!(stored.fencing_token, Some(6));
}

#[tokio::test]
async fn put_if_exists_and_matches_fails_on_missing_record() {
    let store = MemoryStore::new();
    let table = table(&store);

    let err = table
        .put_if_exists_and_matches(&record("L1", "g2", 1), "g1")
        .await
        .unwrap_err();
    assert!(err.is_conditional_check_failed());
    assert!(store.is_empty("locks"));
}

#[tokio::test]
async fn delete_if_exists_and_matches_removes_record() {
    let store = MemoryStore::new();
    let table = table(&store);
    table.put_if_absent(&record("L1", "g1", 1)).await.unwrap();

    table
        .delete_if_exists_and_matches(&key("L1"), "g1")
        .await
        .unwrap();
    assert!(table.get(&key("L1")).await.unwrap().is_none());
}

#[tokio::test]
async fn force_delete_ignores_identity() {
    let store = MemoryStore::new();
    let table = table(&store);
    table.put_if_absent(&record("L1", "g1", 1)).await.unwrap();

    table.force_delete(&key("L1")).await.unwrap();
    assert!(store.is_empty("locks"));
    assert!(matches!(
        store.calls().last(),
        Some(StoreCall::Delete {
            condition: None,
            applied: true,
            ..
        })
    ));
}

#[tokio::test]
async fn get_reports_malformed_items() {
    let store = MemoryStore::new();
    let table = table(&store);
    let codec = crate::codec::RecordCodec::new(KeySchema::new("pk"));
    // Key only, no owner or guid
    store.seed("locks", codec.encode_key(&key("L1")), codec.encode_key(&key("L1")));

    let err = table.get(&key("L1")).await.unwrap_err();
    assert!(matches!(err, StoreError::Malformed(_)));
}

#[tokio::test]
async fn get_uses_consistent_reads() {
    let store = MemoryStore::new();
    let table = table(&store);
    assert!(table.get(&key("L1")).await.unwrap().is_none());
    assert!(matches!(
        store.calls()[0],
        StoreCall::Get {
            consistent_read: true,
            ..
        }
    ));
}
