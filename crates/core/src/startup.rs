// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing of startup resource counts

use crate::error::ConfigError;
use crate::Units;

/// Parse one non-negative count per resource type.
///
/// Exactly `expected` values must be supplied.
pub fn parse_available<S: AsRef<str>>(args: &[S], expected: usize) -> Result<Vec<Units>, ConfigError> {
    if args.len() != expected {
        return Err(ConfigError::ArgumentCount {
            expected,
            found: args.len(),
        });
    }

    args.iter()
        .enumerate()
        .map(|(index, arg)| {
            let raw = arg.as_ref().trim();
            let value: i64 = raw.parse().map_err(|_| ConfigError::InvalidUnits {
                index,
                value: raw.to_string(),
            })?;
            if value < 0 {
                return Err(ConfigError::NegativeUnits { index, value });
            }
            Units::try_from(value).map_err(|_| ConfigError::InvalidUnits {
                index,
                value: raw.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
