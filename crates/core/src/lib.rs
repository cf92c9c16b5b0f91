// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ddlock-core: distributed locks on a conditional-write key-value store
//!
//! This crate provides:
//! - Fail-closed and fail-open acquirers over any [`LockStore`]
//! - The [`Lock`] lease handle with heartbeat renewal and ordered release
//! - The record codec and condition expressions shared by store backends
//! - In-memory and traced stores

pub mod acquire;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod id;
pub mod lock;
pub mod record;
pub mod store;

pub use acquire::{Acquirer, FailClosed, FailOpen};
pub use clock::{Clock, FakeClock, SystemClock};
pub use codec::{AttributeValue, Condition, Item, RecordCodec};
pub use config::{
    default_owner, ClientConfig, ConfigError, FailClosedPolicy, FailOpenPolicy, LockMode,
    TableConfig,
};
pub use error::{HeartbeatError, LockError};
pub use id::{KeySchema, LockId, LockKey, SequentialTokenGen, TokenGen, UuidTokenGen};
pub use lock::Lock;
pub use record::{LockRecord, DEFAULT_LEASE_DURATION, RELEASED_LEASE_DURATION};
pub use store::{
    DeleteRequest, GetRequest, LockStore, LockTable, MemoryStore, PutRequest, StoreCall,
    StoreError, TracedStore,
};
