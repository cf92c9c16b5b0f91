// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for lock acquisition and release

use crate::id::LockKey;
use crate::store::StoreError;
use thiserror::Error;

/// Errors returned by acquirers and lock handles
#[derive(Debug, Error)]
pub enum LockError {
    #[error("invalid lock request: {0}")]
    Validation(String),
    #[error("failed to acquire lock")]
    FailedToAcquireLock {
        #[source]
        source: StoreError,
    },
    /// The record was mutated or removed by someone else. Fail-closed records
    /// never expire, so this needs manual intervention.
    #[error("failed to release lock")]
    FailedToReleaseLock {
        #[source]
        source: StoreError,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LockError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            LockError::Validation(_) => "ValidationError",
            LockError::FailedToAcquireLock { .. } => "FailedToAcquireLock",
            LockError::FailedToReleaseLock { .. } => "FailedToReleaseLock",
            LockError::Store(_) => "StoreError",
        }
    }
}

/// A lease renewal that failed; renewal has stopped for this lock
#[derive(Debug, Error)]
#[error("heartbeat failed for lock {key}")]
pub struct HeartbeatError {
    pub key: LockKey,
    pub fencing_token: Option<u64>,
    #[source]
    pub source: StoreError,
}
