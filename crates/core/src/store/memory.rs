// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process lock store
//!
//! Conditional writes are evaluated and applied under one mutex, so they are
//! linearizable per key. Calls are recorded in the order the store applied
//! them, which is what race tests assert on.

use super::{DeleteRequest, GetRequest, LockStore, PutRequest, StoreError};
use crate::codec::Item;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Recorded store call, in application order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get {
        table: String,
        key: Item,
        consistent_read: bool,
    },
    Put {
        table: String,
        item: Item,
        condition: Option<String>,
        applied: bool,
    },
    Delete {
        table: String,
        key: Item,
        condition: Option<String>,
        applied: bool,
    },
}

impl StoreCall {
    /// Whether this call changed stored state
    pub fn is_applied_write(&self) -> bool {
        matches!(
            self,
            StoreCall::Put { applied: true, .. } | StoreCall::Delete { applied: true, .. }
        )
    }
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, HashMap<Item, Item>>,
    calls: Vec<StoreCall>,
    injected: VecDeque<StoreError>,
    write_latency: Option<Duration>,
}

/// In-memory store with call recording and fault injection
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Clear recorded calls
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Insert an item directly, bypassing conditions
    pub fn seed(&self, table: &str, key: Item, item: Item) {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .insert(key, item);
    }

    /// Current item for a key
    pub fn item(&self, table: &str, key: &Item) -> Option<Item> {
        self.lock()
            .tables
            .get(table)
            .and_then(|t| t.get(key))
            .cloned()
    }

    /// Number of items in a table
    pub fn len(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Fail the next operation with `error`
    pub fn fail_next(&self, error: StoreError) {
        self.lock().injected.push_back(error);
    }

    /// Delay every put and delete before it is applied
    pub fn set_write_latency(&self, latency: Option<Duration>) {
        self.lock().write_latency = latency;
    }

    async fn write_delay(&self) {
        let latency = self.lock().write_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl LockStore for MemoryStore {
    async fn get(&self, request: GetRequest) -> Result<Option<Item>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Get {
            table: request.table.clone(),
            key: request.key.clone(),
            consistent_read: request.consistent_read,
        });
        if let Some(error) = state.injected.pop_front() {
            return Err(error);
        }
        Ok(state
            .tables
            .get(&request.table)
            .and_then(|t| t.get(&request.key))
            .cloned())
    }

    async fn put(&self, request: PutRequest) -> Result<(), StoreError> {
        self.write_delay().await;

        let mut guard = self.lock();
        let state = &mut *guard;
        let rendered = request.condition.as_ref().map(|c| c.to_string());
        if let Some(error) = state.injected.pop_front() {
            state.calls.push(StoreCall::Put {
                table: request.table,
                item: request.item,
                condition: rendered,
                applied: false,
            });
            return Err(error);
        }

        let table = state.tables.entry(request.table.clone()).or_default();
        let holds = request
            .condition
            .as_ref()
            .is_none_or(|c| c.evaluate(table.get(&request.key)));
        if holds {
            table.insert(request.key, request.item.clone());
        }
        state.calls.push(StoreCall::Put {
            table: request.table,
            item: request.item,
            condition: rendered,
            applied: holds,
        });

        if holds {
            Ok(())
        } else {
            Err(StoreError::ConditionalCheckFailed)
        }
    }

    async fn delete(&self, request: DeleteRequest) -> Result<(), StoreError> {
        self.write_delay().await;

        let mut guard = self.lock();
        let state = &mut *guard;
        let rendered = request.condition.as_ref().map(|c| c.to_string());
        if let Some(error) = state.injected.pop_front() {
            state.calls.push(StoreCall::Delete {
                table: request.table,
                key: request.key,
                condition: rendered,
                applied: false,
            });
            return Err(error);
        }

        let table = state.tables.entry(request.table.clone()).or_default();
        let holds = request
            .condition
            .as_ref()
            .is_none_or(|c| c.evaluate(table.get(&request.key)));
        if holds {
            table.remove(&request.key);
        }
        state.calls.push(StoreCall::Delete {
            table: request.table,
            key: request.key,
            condition: rendered,
            applied: holds,
        });

        if holds {
            Ok(())
        } else {
            Err(StoreError::ConditionalCheckFailed)
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
