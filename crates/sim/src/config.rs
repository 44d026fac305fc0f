// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation configuration

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How many consumers to run and how they pace themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Number of consumer workers
    pub consumers: usize,
    /// Number of resource types (startup counts expected)
    pub resources: usize,
    /// Request/release cycles per consumer, 0 to run until cancelled
    pub cycles: u64,
    /// Minimum time a grant is held before releasing
    #[serde(with = "humantime_serde")]
    pub use_time: Duration,
    /// Extra random hold time, drawn from `[0, use_jitter)`
    #[serde(with = "humantime_serde")]
    pub use_jitter: Duration,
    /// Pause after drawing an all-zero request
    #[serde(with = "humantime_serde")]
    pub idle_pause: Duration,
    /// Pause between scenario setup and starting the consumers
    #[serde(with = "humantime_serde")]
    pub startup_delay: Duration,
    /// Seed for reproducible scenarios and workloads
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            consumers: 5,
            resources: 3,
            cycles: 200,
            use_time: Duration::from_millis(200),
            use_jitter: Duration::from_millis(50),
            idle_pause: Duration::from_millis(50),
            startup_delay: Duration::ZERO,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Fast pacing for tests
    pub fn for_testing() -> Self {
        Self {
            cycles: 20,
            use_time: Duration::from_millis(1),
            use_jitter: Duration::from_millis(2),
            idle_pause: Duration::from_millis(1),
            seed: Some(7),
            ..Self::default()
        }
    }

    /// Load a config from a TOML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SimError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_consumers(mut self, consumers: usize) -> Self {
        self.consumers = consumers;
        self
    }

    pub fn with_cycles(mut self, cycles: u64) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
