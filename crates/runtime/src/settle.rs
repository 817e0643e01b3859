// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Waiting for the execution surface to publish its output.
//!
//! The surface gives no completion signal. After the trigger the pipeline
//! waits according to a [`SettlePolicy`] and then reads the output map. This
//! is an advisory wait with no ordering guarantee: a slow surface can still
//! be read before it has written, and the stale value is returned as if it
//! were fresh.

use map_ipc::{MapError, MapStore};
use std::time::Duration;

/// How long to wait between the trigger and the output lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlePolicy {
    /// Look up immediately.
    Immediate,
    /// Sleep for a fixed interval.
    Fixed(Duration),
    /// Re-read the output map every `interval` until it differs from the
    /// value seen before the trigger, at most `max_attempts` times.
    ///
    /// Identical consecutive inputs produce identical outputs, so an
    /// unchanged value is not proof the surface did not run.
    PollUntilChanged { interval: Duration, max_attempts: u32 },
}

/// What the wait observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// No observation was made (immediate or fixed delay).
    Elapsed,
    /// The output changed after `attempts` reads.
    Changed { attempts: u32 },
    /// The output did not change within `attempts` reads.
    Unchanged { attempts: u32 },
}

impl SettlePolicy {
    /// Returns `true` if the policy needs the output value from before the
    /// trigger.
    pub fn needs_baseline(&self) -> bool {
        matches!(self, SettlePolicy::PollUntilChanged { .. })
    }

    /// Performs the wait. `baseline` is the output value read before the
    /// trigger; it is ignored by policies that do not poll.
    pub fn wait<S: MapStore>(
        &self,
        output: &S,
        key: u32,
        baseline: Option<&[u8]>,
    ) -> Result<SettleOutcome, MapError> {
        match self {
            SettlePolicy::Immediate => Ok(SettleOutcome::Elapsed),
            SettlePolicy::Fixed(delay) => {
                std::thread::sleep(*delay);
                Ok(SettleOutcome::Elapsed)
            }
            SettlePolicy::PollUntilChanged {
                interval,
                max_attempts,
            } => {
                let Some(baseline) = baseline else {
                    std::thread::sleep(*interval);
                    return Ok(SettleOutcome::Elapsed);
                };
                for attempt in 1..=*max_attempts {
                    std::thread::sleep(*interval);
                    if output.lookup(key)? != baseline {
                        return Ok(SettleOutcome::Changed { attempts: attempt });
                    }
                }
                tracing::warn!(
                    "output map {} unchanged after {max_attempts} polls",
                    output.describe()
                );
                Ok(SettleOutcome::Unchanged {
                    attempts: *max_attempts,
                })
            }
        }
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        SettlePolicy::Fixed(Duration::from_millis(100))
    }
}

impl std::fmt::Display for SettlePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlePolicy::Immediate => write!(f, "immediate"),
            SettlePolicy::Fixed(d) => write!(f, "fixed {}ms", d.as_millis()),
            SettlePolicy::PollUntilChanged {
                interval,
                max_attempts,
            } => write!(f, "poll every {}ms (max {max_attempts})", interval.as_millis()),
        }
    }
}
