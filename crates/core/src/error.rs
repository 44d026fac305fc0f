// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ledger construction and arbiter operations

use crate::Units;
use thiserror::Error;

/// Malformed construction input. Fatal: the arbiter is never built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("expected {expected} resource counts, got {found}")]
    ArgumentCount { expected: usize, found: usize },
    #[error("resource count {index} is not a valid count: {value:?}")]
    InvalidUnits { index: usize, value: String },
    #[error("resource count {index} is negative: {value}")]
    NegativeUnits { index: usize, value: i64 },
    #[error("at least one resource type and one consumer are required")]
    Empty,
    #[error("expected {expected} consumers, got {found}")]
    ConsumerCount { expected: usize, found: usize },
    #[error("row for consumer {consumer} has {found} entries, expected {expected}")]
    RowLength {
        consumer: usize,
        expected: usize,
        found: usize,
    },
    #[error("total supply of resource {resource} does not fit in a unit count")]
    SupplyOverflow { resource: usize },
    #[error(
        "consumer {consumer} declares a maximum of {maximum} for resource {resource}, \
         but only {supply} exist"
    )]
    MaximumExceedsSupply {
        consumer: usize,
        resource: usize,
        maximum: Units,
        supply: Units,
    },
    #[error(
        "consumer {consumer} holds {allocation} of resource {resource}, \
         above its maximum {maximum}"
    )]
    AllocationAboveMaximum {
        consumer: usize,
        resource: usize,
        allocation: Units,
        maximum: Units,
    },
}

/// Errors returned to the immediate caller of an arbiter operation.
///
/// None of these change the ledger; other consumers are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArbiterError {
    #[error("unknown consumer {consumer} (arbiter has {consumers})")]
    UnknownConsumer { consumer: usize, consumers: usize },
    #[error("unknown resource {resource} (arbiter has {resources})")]
    UnknownResource { resource: usize, resources: usize },
    #[error("vector has {found} entries, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error(
        "consumer {consumer} requested {requested} of resource {resource} \
         but only needs {need}"
    )]
    ExceedsDeclaredMaximum {
        consumer: usize,
        resource: usize,
        requested: Units,
        need: Units,
    },
    #[error(
        "consumer {consumer} tried to release {released} of resource {resource} \
         but holds {held}"
    )]
    ExceedsCurrentAllocation {
        consumer: usize,
        resource: usize,
        released: Units,
        held: Units,
    },
    #[error("request by consumer {consumer} was cancelled while waiting")]
    Cancelled { consumer: usize },
}

impl ArbiterError {
    /// Whether retrying the same call can never succeed.
    pub fn is_usage_error(&self) -> bool {
        !matches!(self, ArbiterError::Cancelled { .. })
    }
}

/// A ledger invariant that does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("consumer {consumer} holds {allocation} of resource {resource}, above its maximum {maximum}")]
    AllocationAboveMaximum {
        consumer: usize,
        resource: usize,
        allocation: Units,
        maximum: Units,
    },
    #[error("need[{consumer}][{resource}] is {need}, expected {expected}")]
    NeedMismatch {
        consumer: usize,
        resource: usize,
        need: Units,
        expected: Units,
    },
    #[error("resource {resource} accounts for {accounted} units, total supply is {total}")]
    SupplyMismatch {
        resource: usize,
        accounted: u64,
        total: Units,
    },
}
