// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lease handle returned by a successful acquisition
//!
//! A [`Lock`] owns an optional heartbeat task that rewrites the record under a
//! fresh identity token every period. The lease state sits behind an async
//! mutex that the heartbeat holds for the whole of each renewal write, so
//! [`Lock::release`] acquiring that mutex is the join point: the release write
//! is always issued after any renewal that was already underway.

use crate::clock::Clock;
use crate::error::{HeartbeatError, LockError};
use crate::id::{LockKey, TokenGen};
use crate::record::{LockRecord, RELEASED_LEASE_DURATION};
use crate::store::{LockStore, LockTable, StoreError};
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// How a lock gives up its record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LeaseKind {
    /// Delete the record; a mismatch is fatal
    FailClosed,
    /// Expire the record in place, keeping the fencing token
    FailOpen { trust_local_time: bool },
}

/// Store writes a lock issues after acquisition
#[async_trait]
pub(crate) trait LeaseWriter: Send + Sync + 'static {
    /// Rewrite the record under a fresh identity token, returning it
    async fn renew(&self, current_token: &str) -> Result<String, StoreError>;

    async fn release(&self, current_token: &str) -> Result<(), LockError>;
}

/// [`LeaseWriter`] over a lock table
pub(crate) struct RecordWriter<S, C, T> {
    table: LockTable<S>,
    record: LockRecord,
    kind: LeaseKind,
    clock: C,
    tokens: T,
}

impl<S, C, T> RecordWriter<S, C, T>
where
    S: LockStore,
    C: Clock,
    T: TokenGen,
{
    pub(crate) fn new(
        table: LockTable<S>,
        record: LockRecord,
        kind: LeaseKind,
        clock: C,
        tokens: T,
    ) -> Self {
        Self {
            table,
            record,
            kind,
            clock,
            tokens,
        }
    }

    fn acquired_time(&self) -> Option<u64> {
        match self.kind {
            LeaseKind::FailOpen {
                trust_local_time: true,
            } => Some(self.clock.now_unix_ms()),
            _ => None,
        }
    }
}

#[async_trait]
impl<S, C, T> LeaseWriter for RecordWriter<S, C, T>
where
    S: LockStore,
    C: Clock,
    T: TokenGen,
{
    async fn renew(&self, current_token: &str) -> Result<String, StoreError> {
        let token = self.tokens.rotate(current_token);
        let record = self
            .record
            .clone()
            .with_identity_token(&token)
            .with_lock_acquired_time(self.acquired_time());
        self.table
            .put_if_exists_and_matches(&record, current_token)
            .await?;
        Ok(token)
    }

    async fn release(&self, current_token: &str) -> Result<(), LockError> {
        match self.kind {
            LeaseKind::FailClosed => self
                .table
                .delete_if_exists_and_matches(&self.record.key, current_token)
                .await
                .map_err(|e| match e {
                    StoreError::ConditionalCheckFailed => {
                        LockError::FailedToReleaseLock { source: e }
                    }
                    other => LockError::Store(other),
                }),
            LeaseKind::FailOpen { .. } => {
                let record = self
                    .record
                    .clone()
                    .with_identity_token(current_token)
                    .with_lease_duration(RELEASED_LEASE_DURATION)
                    .with_lock_acquired_time(self.acquired_time());
                match self
                    .table
                    .put_if_exists_and_matches(&record, current_token)
                    .await
                {
                    Ok(()) => Ok(()),
                    // Already taken over or removed; this process no longer holds it either way
                    Err(StoreError::ConditionalCheckFailed) => {
                        tracing::debug!(key = %self.record.key, "lock already taken over at release");
                        Ok(())
                    }
                    Err(e) => Err(LockError::Store(e)),
                }
            }
        }
    }
}

struct LeaseState {
    identity_token: String,
    released: bool,
}

struct Shared {
    writer: Box<dyn LeaseWriter>,
    state: tokio::sync::Mutex<LeaseState>,
    /// Set before `state` is contended, so a heartbeat waiting on the mutex
    /// backs off instead of renewing
    stopping: AtomicBool,
    /// Mirrors `LeaseState::released` for synchronous readers
    released: AtomicBool,
    stop: watch::Sender<bool>,
}

impl Shared {
    fn stop(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        self.stop.send_replace(true);
    }

    fn stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }
}

/// A held lock
pub struct Lock {
    key: LockKey,
    owner: String,
    fencing_token: Option<u64>,
    shared: Arc<Shared>,
    heartbeat: std::sync::Mutex<Option<JoinHandle<()>>>,
    heartbeat_errors: Option<mpsc::UnboundedReceiver<HeartbeatError>>,
}

impl Lock {
    /// Wrap a freshly written record. Heartbeats run when `heartbeat_period`
    /// is set and non-zero.
    pub(crate) fn new(
        record: &LockRecord,
        writer: Box<dyn LeaseWriter>,
        heartbeat_period: Option<Duration>,
    ) -> Self {
        let (stop, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            writer,
            state: tokio::sync::Mutex::new(LeaseState {
                identity_token: record.identity_token.clone(),
                released: false,
            }),
            stopping: AtomicBool::new(false),
            released: AtomicBool::new(false),
            stop,
        });

        let (heartbeat, heartbeat_errors) = match heartbeat_period.filter(|p| !p.is_zero()) {
            Some(period) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let task = Heartbeat {
                    shared: Arc::clone(&shared),
                    key: record.key.clone(),
                    fencing_token: record.fencing_token,
                    period,
                    stop: shared.stop.subscribe(),
                    errors: tx,
                };
                (Some(tokio::spawn(task.run())), Some(rx))
            }
            None => (None, None),
        };

        Self {
            key: record.key.clone(),
            owner: record.owner.clone(),
            fencing_token: record.fencing_token,
            shared,
            heartbeat: std::sync::Mutex::new(heartbeat),
            heartbeat_errors,
        }
    }

    pub fn key(&self) -> &LockKey {
        &self.key
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Fencing token for this holding; `None` for fail-closed locks
    pub fn fencing_token(&self) -> Option<u64> {
        self.fencing_token
    }

    /// Identity token of the last write this lock made
    pub async fn identity_token(&self) -> String {
        self.shared.state.lock().await.identity_token.clone()
    }

    pub fn is_released(&self) -> bool {
        self.shared.released.load(Ordering::SeqCst)
    }

    /// Heartbeat failure notifications
    ///
    /// Returns `None` when heartbeats are disabled or the receiver was
    /// already taken. At most one error is delivered; renewal stops after it.
    pub fn take_heartbeat_errors(&mut self) -> Option<mpsc::UnboundedReceiver<HeartbeatError>> {
        self.heartbeat_errors.take()
    }

    /// Give up the lock
    ///
    /// Stops future heartbeats, waits out any renewal already in flight, then
    /// writes the release. Once a release write succeeds, or fails because
    /// the record changed hands, later calls return `Ok(())` without writing.
    /// A store error leaves the lock held so the caller can call again.
    pub async fn release(&self) -> Result<(), LockError> {
        self.shared.stop();

        let result = {
            let mut state = self.shared.state.lock().await;
            if state.released {
                return Ok(());
            }
            let result = self.shared.writer.release(&state.identity_token).await;
            if !matches!(result, Err(LockError::Store(_))) {
                state.released = true;
                self.shared.released.store(true, Ordering::SeqCst);
            }
            result
        };

        let handle = self
            .heartbeat
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        match &result {
            Ok(()) => tracing::info!(key = %self.key, fencing_token = ?self.fencing_token, "lock released"),
            Err(e) => tracing::warn!(key = %self.key, error = %e, "lock release failed"),
        }
        result
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

impl fmt::Debug for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock")
            .field("key", &self.key)
            .field("owner", &self.owner)
            .field("fencing_token", &self.fencing_token)
            .field("released", &self.is_released())
            .finish()
    }
}

struct Heartbeat {
    shared: Arc<Shared>,
    key: LockKey,
    fencing_token: Option<u64>,
    period: Duration,
    stop: watch::Receiver<bool>,
    errors: mpsc::UnboundedSender<HeartbeatError>,
}

impl Heartbeat {
    async fn run(mut self) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.period) => {}
                _ = self.stop.changed() => return,
            }

            // Held across the write: this is what release waits on
            let mut state = self.shared.state.lock().await;
            if state.released || self.shared.stopping() {
                return;
            }
            match self.shared.writer.renew(&state.identity_token).await {
                Ok(token) => {
                    tracing::debug!(key = %self.key, "lease renewed");
                    state.identity_token = token;
                }
                Err(source) => {
                    tracing::warn!(key = %self.key, error = %source, "heartbeat failed, renewal stopped");
                    let _ = self.errors.send(HeartbeatError {
                        key: self.key.clone(),
                        fencing_token: self.fencing_token,
                        source,
                    });
                    return;
                }
            }
            drop(state);

            if self.shared.stopping() {
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
