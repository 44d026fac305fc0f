// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! banker-core: deadlock-avoidance resource arbiter
//!
//! This crate provides:
//! - The resource ledger (available, allocation, maximum and need)
//! - A pure safety checker for candidate ledger states
//! - The arbiter that serializes requests and releases and wakes waiters
//! - Parsing of startup resource counts

pub mod arbiter;
pub mod error;
pub mod ledger;
pub mod safety;
pub mod startup;

pub use arbiter::{Arbiter, ArbiterStats, Attempt, LedgerSnapshot};
pub use error::{ArbiterError, ConfigError, InvariantViolation};
pub use ledger::Ledger;
pub use safety::{is_safe, safe_sequence};
pub use startup::parse_available;

/// Units of a single resource type.
pub type Units = u32;
