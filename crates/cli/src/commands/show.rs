// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ddlock show <id>` - Show the current record for a lock

use super::{lock_table, LockArgs};
use crate::output::{self, OutputFormat};
use crate::Store;
use anyhow::Result;
use clap::Args;
use ddlock_core::clock::millis;
use ddlock_core::{ClientConfig, LockRecord};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub async fn handle(args: ShowArgs, config: &ClientConfig, store: Store) -> Result<()> {
    let key = args.lock.resolve(config)?;
    match lock_table(config, store).get(&key).await? {
        Some(record) => output::print(&RecordView::from(&record), args.format),
        None => output::print_not_held(&key, args.format),
    }
}

/// Printable form of a lock record
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub lock: String,
    pub owner: String,
    pub identity_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fencing_token: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_acquired_time_unix_ms: Option<u64>,
}

impl From<&LockRecord> for RecordView {
    fn from(record: &LockRecord) -> Self {
        Self {
            lock: record.key.to_string(),
            owner: record.owner.clone(),
            identity_token: record.identity_token.clone(),
            fencing_token: record.fencing_token,
            lease_duration_ms: record.lease_duration.map(millis),
            lock_acquired_time_unix_ms: record.lock_acquired_time_unix_ms,
        }
    }
}

impl fmt::Display for RecordView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lock: {}", self.lock)?;
        writeln!(f, "  Owner: {}", self.owner)?;
        write!(f, "  Identity token: {}", self.identity_token)?;
        if let Some(token) = self.fencing_token {
            write!(f, "\n  Fencing token: {}", token)?;
        }
        if let Some(lease) = self.lease_duration_ms {
            write!(f, "\n  Lease: {}ms", lease)?;
        }
        if let Some(acquired) = self.lock_acquired_time_unix_ms {
            write!(f, "\n  Acquired at: {}", acquired)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
