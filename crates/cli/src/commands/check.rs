// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Check command: is a ledger state safe?

use crate::output::{self, join, OutputFormat};
use anyhow::{Context, Result};
use banker_core::{Ledger, Units};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code for a well-formed but unsafe state
const UNSAFE_EXIT: u8 = 2;

#[derive(clap::Args)]
pub struct CheckArgs {
    /// State file (TOML) with `available`, `maximum` and optional `allocation`
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StateFile {
    available: Vec<Units>,
    maximum: Vec<Vec<Units>>,
    allocation: Option<Vec<Vec<Units>>>,
}

#[derive(Serialize)]
struct Verdict {
    safe: bool,
    order: Option<Vec<usize>>,
    need: Vec<Vec<Units>>,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.order {
            Some(order) => write!(f, "safe: {}", join(order)),
            None => write!(f, "unsafe"),
        }
    }
}

pub fn handle(args: CheckArgs) -> Result<ExitCode> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let state: StateFile = toml::from_str(&content)
        .with_context(|| format!("parsing {}", args.file.display()))?;

    let ledger = match state.allocation {
        Some(allocation) => Ledger::with_allocation(state.available, state.maximum, allocation)?,
        None => Ledger::new(state.available, state.maximum)?,
    };

    let order = ledger.safe_sequence();
    let verdict = Verdict {
        safe: order.is_some(),
        order,
        need: ledger.need().to_vec(),
    };
    output::print(&verdict, args.output);

    Ok(if verdict.safe {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(UNSAFE_EXIT)
    })
}
