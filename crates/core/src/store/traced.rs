// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use super::{DeleteRequest, GetRequest, LockStore, PutRequest, StoreError};
use crate::clock::millis;
use crate::codec::Item;
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any LockStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn log_write_outcome(result: &Result<(), StoreError>, elapsed_ms: u64, done: &str) {
    match result {
        Ok(()) => tracing::debug!(elapsed_ms, "{}", done),
        // Contention is expected; callers decide whether it matters
        Err(StoreError::ConditionalCheckFailed) => {
            tracing::debug!(elapsed_ms, "condition not met")
        }
        Err(e) => tracing::warn!(elapsed_ms, error = %e, "store call failed"),
    }
}

#[async_trait]
impl<S: LockStore> LockStore for TracedStore<S> {
    async fn get(&self, request: GetRequest) -> Result<Option<Item>, StoreError> {
        let span = tracing::debug_span!(
            "store.get",
            table = %request.table,
            consistent_read = request.consistent_read
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.get(request).await;
            let elapsed_ms = millis(start.elapsed());
            match &result {
                Ok(item) => tracing::debug!(elapsed_ms, found = item.is_some(), "read"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "store call failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn put(&self, request: PutRequest) -> Result<(), StoreError> {
        let condition = request.condition.as_ref().map(|c| c.to_string());
        let span = tracing::debug_span!(
            "store.put",
            table = %request.table,
            condition = condition.as_deref().unwrap_or("none")
        );
        async {
            tracing::trace!(attributes = request.item.len(), "writing");
            let start = std::time::Instant::now();
            let result = self.inner.put(request).await;
            log_write_outcome(&result, millis(start.elapsed()), "written");
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, request: DeleteRequest) -> Result<(), StoreError> {
        let condition = request.condition.as_ref().map(|c| c.to_string());
        let span = tracing::debug_span!(
            "store.delete",
            table = %request.table,
            condition = condition.as_deref().unwrap_or("none")
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.delete(request).await;
            log_write_outcome(&result, millis(start.elapsed()), "deleted");
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
