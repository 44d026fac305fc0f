// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run command: simulate consumers against one arbiter

use crate::output::{self, join, OutputFormat};
use anyhow::Result;
use banker_core::parse_available;
use banker_sim::{resolve_seed, run_simulation, setup_arbiter, SimConfig, SimReport};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(clap::Args)]
pub struct RunArgs {
    /// Units available of each resource type
    #[arg(required = true, allow_negative_numbers = true)]
    available: Vec<String>,

    /// Simulation config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of consumers
    #[arg(long)]
    consumers: Option<usize>,

    /// Cycles per consumer (0 runs until interrupted)
    #[arg(long)]
    cycles: Option<u64>,

    /// Seed for the scenario and workloads
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,
}

pub async fn handle(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(consumers) = args.consumers {
        config = config.with_consumers(consumers);
    }
    if let Some(cycles) = args.cycles {
        config = config.with_cycles(cycles);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let available = parse_available(&args.available, config.resources)?;
    let seed = resolve_seed(&config);
    let arbiter = Arc::new(setup_arbiter(available, &config, seed)?);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted, stopping consumers");
                cancel.cancel();
            }
        }
    });

    let report = run_simulation(arbiter, &config, seed, cancel).await?;
    output::print(&RunSummary(&report), args.output);
    Ok(())
}

#[derive(Serialize)]
#[serde(transparent)]
struct RunSummary<'a>(&'a SimReport);

impl fmt::Display for RunSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let ledger = &report.snapshot.ledger;
        let stats = &report.snapshot.stats;

        writeln!(f, "Seed: {}", report.seed)?;
        writeln!(f, "Available: {}", join(ledger.available()))?;
        writeln!(
            f,
            "Grants: {}  Deferrals: {}  Releases: {}  Cancellations: {}",
            stats.grants, stats.deferrals, stats.releases, stats.cancellations
        )?;
        writeln!(f, "Consumers:")?;
        for consumer in &report.consumers {
            writeln!(
                f,
                "  {}: max [{}]  cycles {}  grants {}  completions {}",
                consumer.consumer,
                join(&ledger.maximum()[consumer.consumer]),
                consumer.cycles,
                consumer.grants,
                consumer.completions
            )?;
        }
        write!(f, "Completions: {}", report.total_completions())
    }
}
