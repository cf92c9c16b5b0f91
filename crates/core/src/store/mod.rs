// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditional key-value store contract
//!
//! Backends implement [`LockStore`]: consistent `get`, and `put`/`delete`
//! guarded by a [`Condition`] that must hold atomically for the key.
//! [`LockTable`] builds the lock-specific operations on top of it.

mod memory;
mod table;
mod traced;

pub use memory::{MemoryStore, StoreCall};
pub use table::LockTable;
pub use traced::TracedStore;

use crate::codec::{Condition, Item};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conditional check failed")]
    ConditionalCheckFailed,
    #[error("throttled: {0}")]
    Throttled(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("malformed item: {0}")]
    Malformed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, StoreError::ConditionalCheckFailed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetRequest {
    pub table: String,
    pub key: Item,
    pub consistent_read: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutRequest {
    pub table: String,
    /// Key attributes of `item`
    pub key: Item,
    pub item: Item,
    pub condition: Option<Condition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteRequest {
    pub table: String,
    pub key: Item,
    pub condition: Option<Condition>,
}

/// Backend for lock records
#[async_trait]
pub trait LockStore: Clone + Send + Sync + 'static {
    /// Read the item for a key
    async fn get(&self, request: GetRequest) -> Result<Option<Item>, StoreError>;

    /// Write an item if its condition holds
    async fn put(&self, request: PutRequest) -> Result<(), StoreError>;

    /// Remove an item if its condition holds
    async fn delete(&self, request: DeleteRequest) -> Result<(), StoreError>;
}
