// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock acquisition workflows
//!
//! - **FailClosed** - Exclusive record that never expires; abandoned locks
//!   need operator recovery
//! - **FailOpen** - Leased, fenced record that can be stolen once its lease
//!   runs out

mod fail_closed;
mod fail_open;

pub use fail_closed::FailClosed;
pub use fail_open::FailOpen;

use crate::error::LockError;
use crate::id::LockId;
use crate::lock::Lock;
use crate::store::StoreError;
use async_trait::async_trait;

/// Something that can acquire locks
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn acquire_lock(&self, id: LockId) -> Result<Lock, LockError>;
}

/// Classify a failed acquisition write
///
/// Returns `Ok(())` when the caller should retry, consuming one retry.
fn spend_retry(error: StoreError, retries: &mut u32) -> Result<(), LockError> {
    match error {
        StoreError::ConditionalCheckFailed if *retries > 0 => {
            *retries -= 1;
            Ok(())
        }
        StoreError::ConditionalCheckFailed => Err(LockError::FailedToAcquireLock { source: error }),
        other => Err(LockError::Store(other)),
    }
}

#[cfg(test)]
#[path = "acquire_tests.rs"]
mod tests;
