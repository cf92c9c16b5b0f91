// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{spend_retry, Acquirer};
use crate::clock::{millis, Clock, SystemClock};
use crate::config::{default_owner, FailOpenPolicy, TableConfig};
use crate::error::LockError;
use crate::id::{LockId, LockKey, TokenGen, UuidTokenGen};
use crate::lock::{LeaseKind, Lock, RecordWriter};
use crate::record::LockRecord;
use crate::store::{LockStore, LockTable, StoreError};
use async_trait::async_trait;
use std::time::Duration;

/// Acquirer for leased locks that expire unless renewed
#[derive(Clone)]
pub struct FailOpen<S, C = SystemClock, T = UuidTokenGen> {
    table: LockTable<S>,
    policy: FailOpenPolicy,
    owner: String,
    clock: C,
    tokens: T,
}

/// Acquisition state
#[derive(Debug)]
enum Step {
    /// Read the current record
    CheckExisting,
    /// Create the record, fencing token 1
    AcquireNew,
    /// Steal the record read in `CheckExisting`, once its lease has run out
    AcquireExisting { existing: LockRecord },
    /// Written; hand back the lock
    Configured(LockRecord),
}

impl<S: LockStore> FailOpen<S> {
    pub fn new(store: S, table: &TableConfig, policy: FailOpenPolicy) -> Self {
        Self {
            table: LockTable::new(store, &table.name, table.schema()),
            policy,
            owner: default_owner(),
            clock: SystemClock,
            tokens: UuidTokenGen,
        }
    }
}

impl<S: LockStore, C: Clock, T: TokenGen> FailOpen<S, C, T> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> FailOpen<S, C2, T> {
        FailOpen {
            table: self.table,
            policy: self.policy,
            owner: self.owner,
            clock,
            tokens: self.tokens,
        }
    }

    pub fn with_tokens<T2: TokenGen>(self, tokens: T2) -> FailOpen<S, C, T2> {
        FailOpen {
            table: self.table,
            policy: self.policy,
            owner: self.owner,
            clock: self.clock,
            tokens,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn policy(&self) -> &FailOpenPolicy {
        &self.policy
    }

    /// How long to wait before trying to steal `existing`
    fn wait_before_steal(&self, existing: &LockRecord) -> Duration {
        let lease = existing.lease_or_default();
        if !self.policy.trust_local_time {
            return lease;
        }
        match existing.lock_acquired_time_unix_ms {
            Some(acquired) => {
                let elapsed = self.clock.now_unix_ms().saturating_sub(acquired);
                lease.saturating_sub(Duration::from_millis(elapsed))
            }
            None => lease,
        }
    }

    fn record(&self, key: &LockKey, identity_token: &str, fencing_token: u64) -> LockRecord {
        LockRecord::new(key.clone(), &self.owner, identity_token)
            .with_fencing_token(fencing_token)
            .with_lease_duration(self.policy.lease_duration)
            .with_lock_acquired_time(
                self.policy
                    .trust_local_time
                    .then(|| self.clock.now_unix_ms()),
            )
    }

    async fn step(
        &self,
        step: Step,
        key: &LockKey,
        identity_token: &str,
        retries: &mut u32,
    ) -> Result<Step, LockError> {
        match step {
            Step::CheckExisting => match self.table.get(key).await? {
                None => Ok(Step::AcquireNew),
                Some(existing) => {
                    let wait = self.wait_before_steal(&existing);
                    tracing::debug!(
                        key = %key,
                        holder = %existing.owner,
                        wait_ms = millis(wait),
                        "lock held, waiting out lease"
                    );
                    tokio::time::sleep(wait).await;
                    Ok(Step::AcquireExisting { existing })
                }
            },
            Step::AcquireNew => {
                let record = self.record(key, identity_token, 1);
                match self.table.put_if_absent(&record).await {
                    Ok(()) => Ok(Step::Configured(record)),
                    Err(e) => {
                        spend_retry(e, retries)?;
                        Ok(Step::CheckExisting)
                    }
                }
            }
            Step::AcquireExisting { existing } => {
                let fencing_token = existing
                    .fencing_token
                    .unwrap_or(0)
                    .checked_add(1)
                    .ok_or_else(|| {
                        StoreError::Malformed(format!("fencing token exhausted for lock {}", key))
                    })?;
                let record = self.record(key, identity_token, fencing_token);
                match self
                    .table
                    .put_if_absent_or_matches(
                        &record,
                        &existing.identity_token,
                        existing.fencing_token,
                    )
                    .await
                {
                    Ok(()) => Ok(Step::Configured(record)),
                    Err(e) => {
                        spend_retry(e, retries)?;
                        Ok(Step::CheckExisting)
                    }
                }
            }
            Step::Configured(record) => Ok(Step::Configured(record)),
        }
    }
}

#[async_trait]
impl<S: LockStore, C: Clock, T: TokenGen> Acquirer for FailOpen<S, C, T> {
    async fn acquire_lock(&self, id: LockId) -> Result<Lock, LockError> {
        let key = self.table.schema().resolve(id)?;
        let identity_token = self.tokens.generate();
        let mut retries = self.policy.retry_count;

        let mut step = Step::CheckExisting;
        let record = loop {
            step = match step {
                Step::Configured(record) => break record,
                step => {
                    self.step(step, &key, &identity_token, &mut retries)
                        .await?
                }
            };
        };

        tracing::info!(
            key = %record.key,
            fencing_token = ?record.fencing_token,
            "lock acquired"
        );
        let writer = RecordWriter::new(
            self.table.clone(),
            record.clone(),
            LeaseKind::FailOpen {
                trust_local_time: self.policy.trust_local_time,
            },
            self.clock.clone(),
            self.tokens.clone(),
        );
        Ok(Lock::new(&record, Box::new(writer), self.policy.heartbeat()))
    }
}
