// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction for testable lease timestamps

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that reports wall-clock time in Unix milliseconds
///
/// Only the trust-local-time policy consults this; every delay in the lock
/// workflows is measured with `tokio::time` relative to the local process.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now_unix_ms(&self) -> u64;
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(millis)
            .unwrap_or(0)
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current_ms: Arc<AtomicU64>,
}

impl FakeClock {
    /// Start at the given Unix time in milliseconds
    pub fn at(unix_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(AtomicU64::new(unix_ms)),
        }
    }

    pub fn new() -> Self {
        Self::at(1_700_000_000_000)
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        self.current_ms
            .fetch_add(millis(duration), Ordering::SeqCst);
    }

    /// Set the clock to a specific Unix time in milliseconds
    pub fn set(&self, unix_ms: u64) {
        self.current_ms.store(unix_ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now_unix_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
