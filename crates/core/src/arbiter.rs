// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arbiter: serialized requests and releases over one shared ledger
//!
//! The whole ledger is one critical section behind a single mutex. The
//! guard is never held across an `.await`. Requesters that cannot be
//! granted wait on a broadcast [`Notify`] that every release triggers, and
//! re-validate from scratch after each wake.

use crate::error::{ArbiterError, ConfigError};
use crate::ledger::Ledger;
use crate::Units;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outcome of a single, non-blocking grant attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// Committed to the ledger
    Granted,
    /// The available pool does not cover the request
    Insufficient,
    /// Granting now would leave the system in an unsafe state
    Unsafe,
}

/// Counters kept alongside the ledger
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbiterStats {
    pub grants: u64,
    /// Attempts that had to wait (insufficient or unsafe)
    pub deferrals: u64,
    pub releases: u64,
    /// Requests or releases refused as usage errors
    pub rejections: u64,
    pub cancellations: u64,
}

/// Point-in-time copy of the ledger and counters
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub ledger: Ledger,
    pub stats: ArbiterStats,
}

struct State {
    ledger: Ledger,
    stats: ArbiterStats,
}

/// Grants or defers resource requests so the ledger never becomes unsafe.
///
/// Share it between workers as `Arc<Arbiter>`.
pub struct Arbiter {
    state: Mutex<State>,
    released: Notify,
}

impl Arbiter {
    /// Build an arbiter with nothing allocated.
    ///
    /// A maximum above the available supply is rejected with
    /// [`ConfigError::MaximumExceedsSupply`]: that consumer could never finish.
    pub fn new(available: Vec<Units>, maximum: Vec<Vec<Units>>) -> Result<Self, ConfigError> {
        Ok(Self::from_ledger(Ledger::new(available, maximum)?))
    }

    /// Build an arbiter around an existing ledger.
    pub fn from_ledger(ledger: Ledger) -> Self {
        debug!(
            consumers = ledger.consumers(),
            resources = ledger.resources(),
            available = ?ledger.available(),
            "arbiter initialized"
        );
        Self {
            state: Mutex::new(State {
                ledger,
                stats: ArbiterStats::default(),
            }),
            released: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn consumers(&self) -> usize {
        self.lock().ledger.consumers()
    }

    pub fn resources(&self) -> usize {
        self.lock().ledger.resources()
    }

    /// Request `request` units for `consumer`, waiting until the grant is
    /// both covered by the available pool and safe.
    ///
    /// Dropping the returned future abandons the request; nothing is taken
    /// until it resolves to `Ok`.
    pub async fn request(&self, consumer: usize, request: &[Units]) -> Result<(), ArbiterError> {
        self.request_with_cancel(consumer, request, &CancellationToken::new())
            .await
    }

    /// Like [`request`](Self::request), but gives up with
    /// [`ArbiterError::Cancelled`] once `cancel` fires.
    pub async fn request_with_cancel(
        &self,
        consumer: usize,
        request: &[Units],
        cancel: &CancellationToken,
    ) -> Result<(), ArbiterError> {
        debug!(consumer, ?request, "request");
        loop {
            // Created before the ledger is inspected: a release committed
            // after our check is guaranteed to wake this future.
            let released = self.released.notified();
            tokio::pin!(released);

            match self.try_request(consumer, request)? {
                Attempt::Granted => return Ok(()),
                Attempt::Insufficient | Attempt::Unsafe => {}
            }

            tokio::select! {
                () = &mut released => {}
                () = cancel.cancelled() => {
                    self.lock().stats.cancellations += 1;
                    warn!(consumer, ?request, "request cancelled while waiting");
                    return Err(ArbiterError::Cancelled { consumer });
                }
            }
        }
    }

    /// One pass of the grant check, without waiting.
    ///
    /// Usage errors are reported before any availability or safety check.
    pub fn try_request(&self, consumer: usize, request: &[Units]) -> Result<Attempt, ArbiterError> {
        let mut state = self.lock();

        if let Err(e) = state.ledger.check_request(consumer, request) {
            state.stats.rejections += 1;
            warn!(consumer, ?request, error = %e, "request rejected");
            return Err(e);
        }

        if !state.ledger.covers(request) {
            state.stats.deferrals += 1;
            debug!(
                consumer,
                ?request,
                available = ?state.ledger.available(),
                "insufficient resources, waiting"
            );
            return Ok(Attempt::Insufficient);
        }

        let candidate = state.ledger.granted(consumer, request);
        if !candidate.is_safe() {
            state.stats.deferrals += 1;
            debug!(consumer, ?request, "grant would be unsafe, waiting");
            return Ok(Attempt::Unsafe);
        }

        state.ledger = candidate;
        state.stats.grants += 1;
        debug!(
            consumer,
            ?request,
            available = ?state.ledger.available(),
            "request granted"
        );
        Ok(Attempt::Granted)
    }

    /// Return `release` units held by `consumer` and wake every waiter.
    pub fn release(&self, consumer: usize, release: &[Units]) -> Result<(), ArbiterError> {
        {
            let mut state = self.lock();
            if let Err(e) = state.ledger.check_release(consumer, release) {
                state.stats.rejections += 1;
                warn!(consumer, ?release, error = %e, "release rejected");
                return Err(e);
            }
            state.ledger.release(consumer, release);
            state.stats.releases += 1;
            debug!(
                consumer,
                ?release,
                available = ?state.ledger.available(),
                "resources released"
            );
        }
        // Any subset of waiters may now fit; all of them re-check.
        self.released.notify_waiters();
        Ok(())
    }

    /// Remaining need of `consumer` for one resource type
    pub fn current_need(&self, consumer: usize, resource: usize) -> Result<Units, ArbiterError> {
        let state = self.lock();
        let row = state.ledger.need_row(consumer)?;
        row.get(resource)
            .copied()
            .ok_or(ArbiterError::UnknownResource {
                resource,
                resources: row.len(),
            })
    }

    /// Copy of what `consumer` currently holds
    pub fn current_allocation_row(&self, consumer: usize) -> Result<Vec<Units>, ArbiterError> {
        Ok(self.lock().ledger.allocation_row(consumer)?.to_vec())
    }

    /// Copy of the remaining need of `consumer`
    pub fn current_need_row(&self, consumer: usize) -> Result<Vec<Units>, ArbiterError> {
        Ok(self.lock().ledger.need_row(consumer)?.to_vec())
    }

    /// Consistent copy of the whole ledger and counters.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.lock();
        LedgerSnapshot {
            ledger: state.ledger.clone(),
            stats: state.stats.clone(),
        }
    }
}

#[cfg(test)]
#[path = "arbiter_tests.rs"]
mod tests;
