// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ddlock clear <id>` - Delete a stuck lock record

use super::{lock_table, LockArgs};
use crate::Store;
use anyhow::Result;
use clap::Args;
use ddlock_core::ClientConfig;

#[derive(Args)]
pub struct ClearArgs {
    #[command(flatten)]
    pub lock: LockArgs,
}

/// Remove the record regardless of who holds it. Fail-closed records never
/// expire, so this is how an abandoned one is recovered.
pub async fn handle(args: ClearArgs, config: &ClientConfig, store: Store) -> Result<()> {
    let key = args.lock.resolve(config)?;
    let table = lock_table(config, store);

    match table.get(&key).await? {
        Some(record) => {
            table.force_delete(&key).await?;
            tracing::info!(key = %key, owner = %record.owner, "lock record cleared");
            println!("Cleared lock: {} (was held by {})", key, record.owner);
        }
        None => println!("Lock not held: {}", key),
    }
    Ok(())
}
