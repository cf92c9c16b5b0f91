// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{spend_retry, Acquirer};
use crate::clock::SystemClock;
use crate::config::{default_owner, FailClosedPolicy, TableConfig};
use crate::error::LockError;
use crate::id::{LockId, TokenGen, UuidTokenGen};
use crate::lock::{LeaseKind, Lock, RecordWriter};
use crate::record::LockRecord;
use crate::store::{LockStore, LockTable};
use async_trait::async_trait;

/// Acquirer for exclusive locks held until explicitly released
#[derive(Clone)]
pub struct FailClosed<S, T = UuidTokenGen> {
    table: LockTable<S>,
    policy: FailClosedPolicy,
    owner: String,
    tokens: T,
}

impl<S: LockStore> FailClosed<S> {
    pub fn new(store: S, table: &TableConfig, policy: FailClosedPolicy) -> Self {
        Self {
            table: LockTable::new(store, &table.name, table.schema()),
            policy,
            owner: default_owner(),
            tokens: UuidTokenGen,
        }
    }
}

impl<S: LockStore, T: TokenGen> FailClosed<S, T> {
    pub fn with_tokens<T2: TokenGen>(self, tokens: T2) -> FailClosed<S, T2> {
        FailClosed {
            table: self.table,
            policy: self.policy,
            owner: self.owner,
            tokens,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn policy(&self) -> &FailClosedPolicy {
        &self.policy
    }
}

#[async_trait]
impl<S: LockStore, T: TokenGen> Acquirer for FailClosed<S, T> {
    async fn acquire_lock(&self, id: LockId) -> Result<Lock, LockError> {
        let key = self.table.schema().resolve(id)?;
        let record = LockRecord::new(key, &self.owner, self.tokens.generate());
        let mut retries = self.policy.retry_count;

        loop {
            match self.table.put_if_absent(&record).await {
                Ok(()) => break,
                Err(e) => {
                    spend_retry(e, &mut retries)?;
                    tracing::debug!(
                        key = %record.key,
                        retries_left = retries,
                        "lock held elsewhere, retrying"
                    );
                    tokio::time::sleep(self.policy.acquire_period).await;
                }
            }
        }

        tracing::info!(key = %record.key, owner = %record.owner, "lock acquired");
        let writer = RecordWriter::new(
            self.table.clone(),
            record.clone(),
            LeaseKind::FailClosed,
            SystemClock,
            self.tokens.clone(),
        );
        Ok(Lock::new(&record, Box::new(writer), None))
    }
}
