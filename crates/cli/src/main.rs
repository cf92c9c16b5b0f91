// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ddlock - run commands under a distributed lock

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{clear, run, show};
use ddlock_core::{ClientConfig, TracedStore};
use ddlock_storage::FileStore;
use std::path::PathBuf;
use std::process::ExitCode;

/// Store backing every command
type Store = TracedStore<FileStore>;

#[derive(Parser)]
#[command(
    name = "ddlock",
    version,
    about = "ddlock - Distributed locks with fencing tokens"
)]
struct Cli {
    /// Lock client configuration file
    #[arg(long, global = true, default_value = "ddlock.toml")]
    config: PathBuf,

    /// Directory holding lock tables
    #[arg(long, global = true, default_value = ".ddlock")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command while holding a lock
    Run(run::RunArgs),
    /// Show the current record for a lock
    Show(show::ShowArgs),
    /// Delete a lock record unconditionally
    Clear(clear::ClearArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    setup_logging();
    let cli = Cli::parse();

    let config = ClientConfig::load(&cli.config)?;
    let store = TracedStore::new(FileStore::open(&cli.store)?);

    match cli.command {
        Commands::Run(args) => run::handle(args, &config, store).await,
        Commands::Show(args) => {
            show::handle(args, &config, store).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Clear(args) => {
            clear::handle(args, &config, store).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
