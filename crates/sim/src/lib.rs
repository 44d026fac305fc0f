// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Simulated consumers driving a banker arbiter

mod config;
mod error;
mod runner;
mod scenario;
mod workload;

pub use config::SimConfig;
pub use error::SimError;
pub use runner::{resolve_seed, run_simulation, setup_arbiter, SimReport};
pub use scenario::generate_maximum;
pub use workload::{Consumer, ConsumerReport};
