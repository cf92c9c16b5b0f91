// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod clear;
pub mod run;
pub mod show;

use clap::Args;
use ddlock_core::{ClientConfig, LockId, LockKey, LockTable};

use crate::Store;

/// Identity of the lock a command operates on
#[derive(Args, Debug, Clone)]
pub struct LockArgs {
    /// Partition key value of the lock
    pub id: String,

    /// Sort key value, for tables with a sort key
    #[arg(long)]
    pub sort: Option<String>,
}

impl LockArgs {
    pub fn lock_id(&self) -> LockId {
        match &self.sort {
            Some(sort) => LockId::composite(self.id.as_str(), sort.as_str()),
            None => LockId::simple(self.id.as_str()),
        }
    }

    /// Resolve against the configured table
    pub fn resolve(&self, config: &ClientConfig) -> anyhow::Result<LockKey> {
        Ok(config.table.schema().resolve(self.lock_id())?)
    }
}

/// The configured lock table on `store`
pub fn lock_table(config: &ClientConfig, store: Store) -> LockTable<Store> {
    LockTable::new(store, &config.table.name, config.table.schema())
}
