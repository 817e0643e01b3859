// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-request stage timings.
//!
//! Nearly all of a request's wall-clock time is spent in the two `bpftool`
//! child processes, the trace scan and the settle wait; these timings make
//! that visible with `-v`.

use std::time::{Duration, Instant};

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Update,
    Trigger,
    Verify,
    Settle,
    Lookup,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Update => "update",
            Stage::Trigger => "trigger",
            Stage::Verify => "verify",
            Stage::Settle => "settle",
            Stage::Lookup => "lookup",
        }
    }
}

/// Timings for a single inference request.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct InferenceMetrics {
    /// Total wall-clock time for the request.
    pub total_duration: Duration,
    /// Stages in the order they ran. Skipped stages are absent.
    pub stages: Vec<(Stage, Duration)>,
}

impl InferenceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` and records its duration under `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(stage, start.elapsed());
        out
    }

    pub fn record(&mut self, stage: Stage, duration: Duration) {
        self.stages.push((stage, duration));
    }

    pub fn finalise(&mut self, total: Duration) {
        self.total_duration = total;
    }

    /// Duration of `stage`, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<Duration> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, d)| *d)
    }

    /// Time spent in map I/O (update + lookup).
    pub fn map_io_duration(&self) -> Duration {
        self.stages
            .iter()
            .filter(|(s, _)| matches!(s, Stage::Update | Stage::Lookup))
            .map(|(_, d)| *d)
            .sum()
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let stages: Vec<String> = self
            .stages
            .iter()
            .map(|(s, d)| format!("{} {:.2}ms", s.as_str(), d.as_secs_f64() * 1000.0))
            .collect();
        format!(
            "Inference: {:.2}ms total ({}), {:.2}ms map I/O",
            self.total_duration.as_secs_f64() * 1000.0,
            stages.join(", "),
            self.map_io_duration().as_secs_f64() * 1000.0,
        )
    }
}
