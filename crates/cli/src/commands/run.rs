// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ddlock run <id> -- <command>...` - Run a command while holding a lock

use super::LockArgs;
use crate::Store;
use anyhow::{Context, Result};
use clap::Args;
use ddlock_core::{Acquirer, ClientConfig, FailClosed, FailOpen, Lock, LockMode};
use std::process::ExitCode;
use tokio::process::Command;
use tokio::sync::mpsc;

/// Environment variable carrying the fencing token to the child
pub const FENCING_TOKEN_ENV: &str = "DDLOCK_FENCING_TOKEN";

/// Exit code after an interrupt, as a shell would report SIGINT
const INTERRUPTED: u8 = 130;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    /// Command and arguments to run
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

pub async fn handle(args: RunArgs, config: &ClientConfig, store: Store) -> Result<ExitCode> {
    let id = args.lock.lock_id();
    let owner = config.owner();
    let mut lock = match config.mode()? {
        LockMode::FailClosed(policy) => {
            FailClosed::new(store, &config.table, policy.clone())
                .with_owner(owner)
                .acquire_lock(id)
                .await?
        }
        LockMode::FailOpen(policy) => {
            FailOpen::new(store, &config.table, policy.clone())
                .with_owner(owner)
                .acquire_lock(id)
                .await?
        }
    };

    match lock.fencing_token() {
        Some(token) => eprintln!("Acquired lock {} (fencing token {})", lock.key(), token),
        None => eprintln!("Acquired lock {}", lock.key()),
    }
    report_heartbeat_errors(&mut lock);

    let outcome = supervise(&lock, &args.command).await;

    // Release whatever happened to the child
    lock.release()
        .await
        .with_context(|| format!("failed to release lock {}", lock.key()))?;
    eprintln!("Released lock {}", lock.key());

    outcome
}

fn report_heartbeat_errors(lock: &mut Lock) {
    if let Some(mut errors) = lock.take_heartbeat_errors() {
        tokio::spawn(async move {
            while let Some(e) = errors.recv().await {
                eprintln!("Warning: {}: {}; lease will expire", e, e.source);
            }
        });
    }
}

/// Run the child until it exits or we are interrupted
async fn supervise(lock: &Lock, command: &[String]) -> Result<ExitCode> {
    let (program, rest) = command
        .split_first()
        .context("no command given")?;

    let mut cmd = Command::new(program);
    cmd.args(rest);
    if let Some(token) = lock.fencing_token() {
        cmd.env(FENCING_TOKEN_ENV, token.to_string());
    }
    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to start {}", program))?;

    let (tx, mut interrupts) = mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;

    tokio::select! {
        status = child.wait() => {
            let status = status?;
            tracing::debug!(?status, "child exited");
            let code = status.code().unwrap_or(1);
            Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
        }
        _ = interrupts.recv() => {
            eprintln!("\nInterrupted, stopping {}", program);
            child.kill().await?;
            Ok(ExitCode::from(INTERRUPTED))
        }
    }
}
