// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource ledger: who holds what, and who still needs what
//!
//! The ledger has no concurrency awareness of its own. Its invariants hold
//! because the [`Arbiter`](crate::Arbiter) serializes every access.

use crate::error::{ArbiterError, ConfigError, InvariantViolation};
use crate::safety;
use crate::Units;
use serde::Serialize;

/// Available, maximum, allocation and need for a fixed set of consumers
/// and resource types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ledger {
    available: Vec<Units>,
    maximum: Vec<Vec<Units>>,
    allocation: Vec<Vec<Units>>,
    need: Vec<Vec<Units>>,
    /// Supply of each resource type, fixed at construction
    total: Vec<Units>,
}

impl Ledger {
    /// Create a ledger where nothing is allocated yet.
    pub fn new(available: Vec<Units>, maximum: Vec<Vec<Units>>) -> Result<Self, ConfigError> {
        let allocation = vec![vec![0; available.len()]; maximum.len()];
        Self::with_allocation(available, maximum, allocation)
    }

    /// Create a ledger from an existing allocation.
    ///
    /// `available` is what is left over; the total supply is derived as
    /// `available + sum(allocation)` and must fit in [`Units`].
    pub fn with_allocation(
        available: Vec<Units>,
        maximum: Vec<Vec<Units>>,
        allocation: Vec<Vec<Units>>,
    ) -> Result<Self, ConfigError> {
        let resources = available.len();
        if resources == 0 || maximum.is_empty() {
            return Err(ConfigError::Empty);
        }
        if allocation.len() != maximum.len() {
            return Err(ConfigError::ConsumerCount {
                expected: maximum.len(),
                found: allocation.len(),
            });
        }
        for (consumer, (max_row, alloc_row)) in maximum.iter().zip(&allocation).enumerate() {
            if let Some(row) = [max_row, alloc_row].into_iter().find(|r| r.len() != resources) {
                return Err(ConfigError::RowLength {
                    consumer,
                    expected: resources,
                    found: row.len(),
                });
            }
        }

        let mut total = available.clone();
        for row in &allocation {
            for (resource, (slot, held)) in total.iter_mut().zip(row).enumerate() {
                *slot = slot
                    .checked_add(*held)
                    .ok_or(ConfigError::SupplyOverflow { resource })?;
            }
        }

        let mut need = Vec::with_capacity(maximum.len());
        for (consumer, (max_row, alloc_row)) in maximum.iter().zip(&allocation).enumerate() {
            let mut need_row = Vec::with_capacity(resources);
            for resource in 0..resources {
                let (max, held) = (max_row[resource], alloc_row[resource]);
                if max > total[resource] {
                    return Err(ConfigError::MaximumExceedsSupply {
                        consumer,
                        resource,
                        maximum: max,
                        supply: total[resource],
                    });
                }
                if held > max {
                    return Err(ConfigError::AllocationAboveMaximum {
                        consumer,
                        resource,
                        allocation: held,
                        maximum: max,
                    });
                }
                need_row.push(max - held);
            }
            need.push(need_row);
        }

        Ok(Self {
            available,
            maximum,
            allocation,
            need,
            total,
        })
    }

    pub fn consumers(&self) -> usize {
        self.maximum.len()
    }

    pub fn resources(&self) -> usize {
        self.available.len()
    }

    pub fn available(&self) -> &[Units] {
        &self.available
    }

    pub fn maximum(&self) -> &[Vec<Units>] {
        &self.maximum
    }

    pub fn allocation(&self) -> &[Vec<Units>] {
        &self.allocation
    }

    pub fn need(&self) -> &[Vec<Units>] {
        &self.need
    }

    pub fn total(&self) -> &[Units] {
        &self.total
    }

    /// Remaining need of one consumer
    pub fn need_row(&self, consumer: usize) -> Result<&[Units], ArbiterError> {
        self.check_consumer(consumer)?;
        Ok(&self.need[consumer])
    }

    /// Current allocation of one consumer
    pub fn allocation_row(&self, consumer: usize) -> Result<&[Units], ArbiterError> {
        self.check_consumer(consumer)?;
        Ok(&self.allocation[consumer])
    }

    fn check_consumer(&self, consumer: usize) -> Result<(), ArbiterError> {
        if consumer >= self.consumers() {
            return Err(ArbiterError::UnknownConsumer {
                consumer,
                consumers: self.consumers(),
            });
        }
        Ok(())
    }

    fn check_vector(&self, consumer: usize, vector: &[Units]) -> Result<(), ArbiterError> {
        self.check_consumer(consumer)?;
        if vector.len() != self.resources() {
            return Err(ArbiterError::DimensionMismatch {
                expected: self.resources(),
                found: vector.len(),
            });
        }
        Ok(())
    }

    /// Validate a request against the consumer's remaining need.
    pub fn check_request(&self, consumer: usize, request: &[Units]) -> Result<(), ArbiterError> {
        self.check_vector(consumer, request)?;
        let need = &self.need[consumer];
        match request.iter().zip(need).position(|(r, n)| r > n) {
            Some(resource) => Err(ArbiterError::ExceedsDeclaredMaximum {
                consumer,
                resource,
                requested: request[resource],
                need: need[resource],
            }),
            None => Ok(()),
        }
    }

    /// Validate a release against what the consumer currently holds.
    pub fn check_release(&self, consumer: usize, release: &[Units]) -> Result<(), ArbiterError> {
        self.check_vector(consumer, release)?;
        let held = &self.allocation[consumer];
        match release.iter().zip(held).position(|(r, h)| r > h) {
            Some(resource) => Err(ArbiterError::ExceedsCurrentAllocation {
                consumer,
                resource,
                released: release[resource],
                held: held[resource],
            }),
            None => Ok(()),
        }
    }

    /// Whether the available pool covers `request` elementwise.
    pub fn covers(&self, request: &[Units]) -> bool {
        request.iter().zip(&self.available).all(|(r, a)| r <= a)
    }

    /// Candidate ledger with `request` granted to `consumer`.
    ///
    /// Callers must have passed [`check_request`](Self::check_request) and
    /// [`covers`](Self::covers) for the same request.
    pub fn granted(&self, consumer: usize, request: &[Units]) -> Ledger {
        let mut candidate = self.clone();
        for (resource, units) in request.iter().enumerate() {
            candidate.available[resource] -= units;
            candidate.allocation[consumer][resource] += units;
            candidate.need[consumer][resource] -= units;
        }
        candidate
    }

    /// Return units from `consumer` to the pool.
    ///
    /// Callers must have passed [`check_release`](Self::check_release).
    pub fn release(&mut self, consumer: usize, release: &[Units]) {
        for (resource, units) in release.iter().enumerate() {
            self.available[resource] += units;
            self.allocation[consumer][resource] -= units;
            self.need[consumer][resource] += units;
        }
    }

    /// Run the safety check against this ledger.
    pub fn is_safe(&self) -> bool {
        safety::is_safe(&self.available, &self.allocation, &self.need)
    }

    /// Finish order proving this ledger safe, if one exists.
    pub fn safe_sequence(&self) -> Option<Vec<usize>> {
        safety::safe_sequence(&self.available, &self.allocation, &self.need)
    }

    /// Verify the bookkeeping invariants, reporting the first violation.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for consumer in 0..self.consumers() {
            for resource in 0..self.resources() {
                let maximum = self.maximum[consumer][resource];
                let allocation = self.allocation[consumer][resource];
                if allocation > maximum {
                    return Err(InvariantViolation::AllocationAboveMaximum {
                        consumer,
                        resource,
                        allocation,
                        maximum,
                    });
                }
                let need = self.need[consumer][resource];
                if need != maximum - allocation {
                    return Err(InvariantViolation::NeedMismatch {
                        consumer,
                        resource,
                        need,
                        expected: maximum - allocation,
                    });
                }
            }
        }

        for resource in 0..self.resources() {
            let accounted = u64::from(self.available[resource])
                + self
                    .allocation
                    .iter()
                    .map(|row| u64::from(row[resource]))
                    .sum::<u64>();
            if accounted != u64::from(self.total[resource]) {
                return Err(InvariantViolation::SupplyMismatch {
                    resource,
                    accounted,
                    total: self.total[resource],
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
