// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation runner: one task per consumer against a shared arbiter

use crate::config::SimConfig;
use crate::error::SimError;
use crate::scenario::generate_maximum;
use crate::workload::{Consumer, ConsumerReport};
use banker_core::{Arbiter, LedgerSnapshot, Units};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Outcome of a simulation run
#[derive(Clone, Debug, Serialize)]
pub struct SimReport {
    pub seed: u64,
    pub consumers: Vec<ConsumerReport>,
    pub snapshot: LedgerSnapshot,
}

impl SimReport {
    pub fn total_grants(&self) -> u64 {
        self.consumers.iter().map(|c| c.grants).sum()
    }

    pub fn total_completions(&self) -> u64 {
        self.consumers.iter().map(|c| c.completions).sum()
    }
}

/// Seed used for this config, drawing a fresh one if none was configured.
pub fn resolve_seed(config: &SimConfig) -> u64 {
    config.seed.unwrap_or_else(rand::random)
}

/// Build an arbiter over `available` with a random maximum per consumer.
pub fn setup_arbiter(
    available: Vec<Units>,
    config: &SimConfig,
    seed: u64,
) -> Result<Arbiter, SimError> {
    let maximum = generate_maximum(&available, config.consumers, &mut StdRng::seed_from_u64(seed));
    for (consumer, row) in maximum.iter().enumerate() {
        info!(consumer, maximum = ?row, "declared maximum");
    }
    Ok(Arbiter::new(available, maximum)?)
}

/// Run every consumer to completion (or cancellation) and audit the ledger.
///
/// If one consumer fails the rest are cancelled and the first error is
/// returned.
pub async fn run_simulation(
    arbiter: Arc<Arbiter>,
    config: &SimConfig,
    seed: u64,
    cancel: CancellationToken,
) -> Result<SimReport, SimError> {
    if !config.startup_delay.is_zero() {
        tokio::select! {
            () = tokio::time::sleep(config.startup_delay) => {}
            () = cancel.cancelled() => {}
        }
    }

    let consumers = arbiter.consumers();
    info!(consumers, seed, "starting consumers");

    let mut workers = JoinSet::new();
    for id in 0..consumers {
        let consumer = Consumer::new(
            id,
            Arc::clone(&arbiter),
            config.clone(),
            seed.wrapping_add(id as u64 + 1),
        );
        workers.spawn(consumer.run(cancel.clone()));
    }

    let mut reports = Vec::with_capacity(consumers);
    let mut failure = None;
    while let Some(joined) = workers.join_next().await {
        match joined.map_err(SimError::from).and_then(|result| result) {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(error = %e, "consumer failed, stopping the others");
                cancel.cancel();
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }
    }
    if let Some(e) = failure {
        return Err(e);
    }
    reports.sort_by_key(|r| r.consumer);

    let snapshot = arbiter.snapshot();
    snapshot.ledger.check_invariants()?;
    info!(
        grants = snapshot.stats.grants,
        deferrals = snapshot.stats.deferrals,
        releases = snapshot.stats.releases,
        "simulation finished"
    );

    Ok(SimReport {
        seed,
        consumers: reports,
        snapshot,
    })
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
