// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safety check: can every consumer still finish?
//!
//! Operates on caller-supplied slices, never on the live ledger, so it can
//! run against a candidate state before that state is committed.

use crate::Units;

/// Whether every consumer can eventually acquire its full need and finish,
/// given `available` plus whatever earlier finishers give back.
pub fn is_safe(available: &[Units], allocation: &[Vec<Units>], need: &[Vec<Units>]) -> bool {
    safe_sequence(available, allocation, need).is_some()
}

/// Order in which consumers can finish, or `None` if the state is unsafe.
///
/// Scans in consumer index order and restarts from the first consumer after
/// every simulated completion, so the order returned is the lowest-index
/// feasible consumer at each step. Worst case `O(C² × R)`.
pub fn safe_sequence(
    available: &[Units],
    allocation: &[Vec<Units>],
    need: &[Vec<Units>],
) -> Option<Vec<usize>> {
    let consumers = need.len();
    // u64 so that adding back allocations cannot overflow
    let mut work: Vec<u64> = available.iter().map(|&a| u64::from(a)).collect();
    let mut finished = vec![false; consumers];
    let mut order = Vec::with_capacity(consumers);

    'scan: loop {
        for consumer in 0..consumers {
            if finished[consumer] {
                continue;
            }
            let fits = need[consumer]
                .iter()
                .zip(&work)
                .all(|(&n, &w)| u64::from(n) <= w);
            if fits {
                for (slot, &held) in work.iter_mut().zip(&allocation[consumer]) {
                    *slot += u64::from(held);
                }
                finished[consumer] = true;
                order.push(consumer);
                continue 'scan;
            }
        }
        break;
    }

    (order.len() == consumers).then_some(order)
}

#[cfg(test)]
#[path = "safety_tests.rs"]
mod tests;
