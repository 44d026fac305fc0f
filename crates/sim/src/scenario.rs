// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Random maximum-demand scenarios

use banker_core::Units;
use rand::Rng;

/// Draw each consumer's maximum demand uniformly from `[0, available[j])`.
///
/// Resource types with nothing available get a maximum of zero.
pub fn generate_maximum<R: Rng + ?Sized>(
    available: &[Units],
    consumers: usize,
    rng: &mut R,
) -> Vec<Vec<Units>> {
    (0..consumers)
        .map(|_| {
            available
                .iter()
                .map(|&supply| if supply == 0 { 0 } else { rng.gen_range(0..supply) })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod tests;
