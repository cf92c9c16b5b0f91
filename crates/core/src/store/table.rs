// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock table: record-level conditional operations

use super::{DeleteRequest, GetRequest, LockStore, PutRequest, StoreError};
use crate::codec::{Condition, RecordCodec};
use crate::id::{KeySchema, LockKey};
use crate::record::LockRecord;

/// A named table of lock records on some store
#[derive(Clone)]
pub struct LockTable<S> {
    store: S,
    name: String,
    codec: RecordCodec,
}

impl<S: LockStore> LockTable<S> {
    pub fn new(store: S, name: impl Into<String>, schema: KeySchema) -> Self {
        Self {
            store,
            name: name.into(),
            codec: RecordCodec::new(schema),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &KeySchema {
        self.codec.schema()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consistent read of the record for `key`
    pub async fn get(&self, key: &LockKey) -> Result<Option<LockRecord>, StoreError> {
        let item = self
            .store
            .get(GetRequest {
                table: self.name.clone(),
                key: self.codec.encode_key(key),
                consistent_read: true,
            })
            .await?;
        item.map(|item| {
            self.codec
                .decode(&item)
                .map_err(|e| StoreError::Malformed(e.to_string()))
        })
        .transpose()
    }

    /// Create `record`; fails if any record exists for its key
    pub async fn put_if_absent(&self, record: &LockRecord) -> Result<(), StoreError> {
        self.put(record, Condition::key_absent(self.schema())).await
    }

    /// Create `record`, or replace one left unchanged since it was read
    pub async fn put_if_absent_or_matches(
        &self,
        record: &LockRecord,
        expected_identity_token: &str,
        expected_fencing_token: Option<u64>,
    ) -> Result<(), StoreError> {
        let condition = Condition::absent_or_matches(
            self.schema(),
            expected_identity_token,
            expected_fencing_token,
        );
        self.put(record, condition).await
    }

    /// Replace the record only if it still carries `expected_identity_token`
    pub async fn put_if_exists_and_matches(
        &self,
        record: &LockRecord,
        expected_identity_token: &str,
    ) -> Result<(), StoreError> {
        let condition = Condition::exists_and_matches(self.schema(), expected_identity_token);
        self.put(record, condition).await
    }

    /// Delete the record only if it still carries `expected_identity_token`
    pub async fn delete_if_exists_and_matches(
        &self,
        key: &LockKey,
        expected_identity_token: &str,
    ) -> Result<(), StoreError> {
        self.store
            .delete(DeleteRequest {
                table: self.name.clone(),
                key: self.codec.encode_key(key),
                condition: Some(Condition::exists_and_matches(
                    self.schema(),
                    expected_identity_token,
                )),
            })
            .await
    }

    /// Delete the record unconditionally (operator recovery)
    pub async fn force_delete(&self, key: &LockKey) -> Result<(), StoreError> {
        self.store
            .delete(DeleteRequest {
                table: self.name.clone(),
                key: self.codec.encode_key(key),
                condition: None,
            })
            .await
    }

    async fn put(&self, record: &LockRecord, condition: Condition) -> Result<(), StoreError> {
        self.store
            .put(PutRequest {
                table: self.name.clone(),
                key: self.codec.encode_key(&record.key),
                item: self.codec.encode(record),
                condition: Some(condition),
            })
            .await
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
