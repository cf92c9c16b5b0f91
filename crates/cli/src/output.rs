// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of lock state on stdout

use anyhow::Result;
use clap::ValueEnum;
use ddlock_core::LockKey;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print a held lock's view
pub fn print<T: Serialize + Display>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Print that no record exists for `key`
pub fn print_not_held(key: &LockKey, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("Lock not held: {}", key),
        OutputFormat::Json => {
            let value = serde_json::json!({ "lock": key.to_string(), "held": false });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
