// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consumer workload: random requests, simulated use, partial releases

use crate::config::SimConfig;
use crate::error::SimError;
use banker_core::{Arbiter, ArbiterError, Units};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What one consumer did during a run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerReport {
    pub consumer: usize,
    pub cycles: u64,
    pub grants: u64,
    pub releases: u64,
    /// Times the consumer reached its declared maximum and gave everything back
    pub completions: u64,
}

/// One simulated consumer bound to an arbiter
pub struct Consumer {
    id: usize,
    arbiter: Arc<Arbiter>,
    config: SimConfig,
    rng: StdRng,
}

impl Consumer {
    pub fn new(id: usize, arbiter: Arc<Arbiter>, config: SimConfig, seed: u64) -> Self {
        Self {
            id,
            arbiter,
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Run request/use/release cycles until the configured count is reached
    /// or `cancel` fires. Anything still held is released before returning.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<ConsumerReport, SimError> {
        let consumer = self.id;
        info!(consumer, "consumer started");
        let mut report = ConsumerReport {
            consumer,
            ..ConsumerReport::default()
        };

        while self.config.cycles == 0 || report.cycles < self.config.cycles {
            if cancel.is_cancelled() {
                break;
            }
            report.cycles += 1;

            let request = self.draw_request()?;
            if request.iter().all(|&units| units == 0) {
                if !pause(self.config.idle_pause, &cancel).await {
                    break;
                }
                continue;
            }

            match self
                .arbiter
                .request_with_cancel(consumer, &request, &cancel)
                .await
            {
                Ok(()) => report.grants += 1,
                Err(ArbiterError::Cancelled { .. }) => break,
                Err(e) => return Err(e.into()),
            }

            let hold = self.hold_time();
            debug!(consumer, ?hold, "using resources");
            if !pause(hold, &cancel).await {
                break;
            }

            let release = self.draw_release()?;
            if release.iter().any(|&units| units > 0) {
                self.arbiter.release(consumer, &release)?;
                report.releases += 1;
            }

            // A consumer with nothing left to ask for would otherwise sit on
            // its allocation forever.
            if self.arbiter.current_need_row(consumer)?.iter().all(|&n| n == 0) {
                if self.release_everything()? {
                    report.releases += 1;
                }
                report.completions += 1;
                info!(consumer, "consumer reached its maximum and released everything");
            }
        }

        if self.release_everything()? {
            report.releases += 1;
        }
        info!(
            consumer,
            cycles = report.cycles,
            grants = report.grants,
            "consumer stopped"
        );
        Ok(report)
    }

    /// Uniform in `[0, need[j]]` for each resource type
    fn draw_request(&mut self) -> Result<Vec<Units>, SimError> {
        let need = self.arbiter.current_need_row(self.id)?;
        Ok(need.iter().map(|&n| self.rng.gen_range(0..=n)).collect())
    }

    /// Uniform in `[1, held[j]]` for each resource type currently held
    fn draw_release(&mut self) -> Result<Vec<Units>, SimError> {
        let held = self.arbiter.current_allocation_row(self.id)?;
        Ok(held
            .iter()
            .map(|&h| if h == 0 { 0 } else { self.rng.gen_range(1..=h) })
            .collect())
    }

    fn hold_time(&mut self) -> Duration {
        if self.config.use_jitter.is_zero() {
            return self.config.use_time;
        }
        self.config.use_time + self.rng.gen_range(Duration::ZERO..self.config.use_jitter)
    }

    /// Returns whether anything was held.
    fn release_everything(&self) -> Result<bool, SimError> {
        let held = self.arbiter.current_allocation_row(self.id)?;
        if held.iter().all(|&units| units == 0) {
            return Ok(false);
        }
        self.arbiter.release(self.id, &held)?;
        Ok(true)
    }
}

/// Sleep for `duration`; false if cancelled first.
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = tokio::time::sleep(duration) => true,
        () = cancel.cancelled() => false,
    }
}

#[cfg(test)]
#[path = "workload_tests.rs"]
mod tests;
