// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! npool - drive the node pool client against an in-process store

mod commands;
mod output;
mod scheduler;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, simulate};
use nodepool_core::PoolConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "npool",
    version,
    about = "Node pool client - request, accept and release pool nodes"
)]
struct Cli {
    /// Client configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one request/allocate/accept/release cycle against a memory store
    Simulate(simulate::SimulateArgs),
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate(args) => simulate::handle(config, args).await,
        Commands::Config => config::handle(&config),
    }
}

fn load_config(file: Option<&Path>) -> Result<PoolConfig> {
    let config = match file {
        Some(file) => PoolConfig::load(file)?,
        None => PoolConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Log to stderr so stdout stays machine readable
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
