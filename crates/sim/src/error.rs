// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the simulation

use banker_core::{ArbiterError, ConfigError, InvariantViolation};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while setting up or running a simulation
#[derive(Debug, Error)]
pub enum SimError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("arbiter error: {0}")]
    Arbiter(#[from] ArbiterError),
    #[error("consumer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("ledger invariant violated: {0}")]
    InvariantViolated(#[from] InvariantViolation),
}
