// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! banker - deadlock-avoidance resource arbiter simulator

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, run};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "banker",
    version,
    about = "Banker - deadlock-avoidance resource allocation"
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate consumers contending for resources
    Run(run::RunArgs),
    /// Check whether a ledger state is safe
    Check(check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            run::handle(args).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => check::handle(args),
    }
}

/// Logs go to stderr so stdout stays parseable.
fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
