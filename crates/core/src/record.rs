// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The lock record persisted in the store

use crate::id::LockKey;
use std::time::Duration;

/// Lease duration written when a fail-open lock is released
pub const RELEASED_LEASE_DURATION: Duration = Duration::from_millis(1);

/// Lease assumed for an existing record that carries no lease duration
pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(10);

/// A lock record as stored in the table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockRecord {
    pub key: LockKey,
    /// Diagnostic name of the holding process
    pub owner: String,
    /// Regenerated on every write by the holder
    pub identity_token: String,
    /// Lease-based locks only
    pub fencing_token: Option<u64>,
    /// Lease-based locks only
    pub lease_duration: Option<Duration>,
    /// Present only under the trust-local-time policy
    pub lock_acquired_time_unix_ms: Option<u64>,
}

impl LockRecord {
    pub fn new(key: LockKey, owner: impl Into<String>, identity_token: impl Into<String>) -> Self {
        Self {
            key,
            owner: owner.into(),
            identity_token: identity_token.into(),
            fencing_token: None,
            lease_duration: None,
            lock_acquired_time_unix_ms: None,
        }
    }

    pub fn with_fencing_token(mut self, fencing_token: u64) -> Self {
        self.fencing_token = Some(fencing_token);
        self
    }

    pub fn with_lease_duration(mut self, lease_duration: Duration) -> Self {
        self.lease_duration = Some(lease_duration);
        self
    }

    pub fn with_lock_acquired_time(mut self, unix_ms: Option<u64>) -> Self {
        self.lock_acquired_time_unix_ms = unix_ms;
        self
    }

    pub fn with_identity_token(mut self, identity_token: impl Into<String>) -> Self {
        self.identity_token = identity_token.into();
        self
    }

    /// Lease to honour before stealing this record
    pub fn lease_or_default(&self) -> Duration {
        self.lease_duration.unwrap_or(DEFAULT_LEASE_DURATION)
    }
}
