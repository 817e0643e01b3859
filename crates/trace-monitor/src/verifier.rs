// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Trace-feed verification.
//!
//! The surface emits a `bpf_printk` line containing [`TRACE_MARKER`] each
//! time it runs. Those lines show up in `trace_pipe`, a live feed whose
//! reads block until new data arrives.
//!
//! # Bounded Wait
//! A blocking `read` cannot be interrupted portably, so the reader runs on a
//! detached thread that reports through a channel; the caller waits on the
//! channel with `recv_timeout`. On timeout a stop flag is raised. The reader
//! notices it the next time a read returns, which for a silent `trace_pipe`
//! may be much later; until then the thread and its file handle stay alive.
//! Regular files (used in tests) are polled at EOF so the reader exits soon
//! after the flag is set.

use crate::TraceError;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

/// Default location of the kernel trace feed.
pub const DEFAULT_TRACE_PIPE: &str = "/sys/kernel/debug/tracing/trace_pipe";

/// Marker the surface prints on every execution.
pub const TRACE_MARKER: &str = "BPF_INFER:";

/// Sleep between reads once a regular file hits EOF.
const EOF_POLL: Duration = Duration::from_millis(10);

/// Scans a trace feed for a marker within a bounded window.
#[derive(Debug, Clone)]
pub struct TraceVerifier {
    feed_path: PathBuf,
    marker: String,
}

impl TraceVerifier {
    pub fn new(feed_path: impl Into<PathBuf>) -> Self {
        Self {
            feed_path: feed_path.into(),
            marker: TRACE_MARKER.to_string(),
        }
    }

    /// Replaces the marker searched for.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn feed_path(&self) -> &Path {
        &self.feed_path
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns `true` if the marker appears within `timeout`.
    ///
    /// Never fails: an unopenable feed or a read error is logged as a
    /// warning and reported as `false`.
    pub fn verify(&self, timeout: Duration) -> bool {
        match self.scan(timeout) {
            Ok(Some(line)) => {
                tracing::info!("kernel trace confirmed execution: {line}");
                true
            }
            Ok(None) => {
                tracing::warn!(
                    "no '{}' marker in {} within {:?}",
                    self.marker,
                    self.feed_path.display(),
                    timeout
                );
                false
            }
            Err(e) => {
                tracing::warn!("trace verification skipped: {e}");
                false
            }
        }
    }

    /// Reads the feed for up to `timeout` and returns the first line that
    /// contains the marker, trailing whitespace trimmed.
    ///
    /// # Errors
    /// - [`TraceError::TraceUnavailable`] if the feed cannot be opened.
    /// - [`TraceError::ReadError`] if a read fails before the deadline.
    pub fn scan(&self, timeout: Duration) -> Result<Option<String>, TraceError> {
        let file = File::open(&self.feed_path).map_err(|e| TraceError::TraceUnavailable {
            path: self.feed_path.display().to_string(),
            source: e,
        })?;

        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let reader_stop = Arc::clone(&stop);
        let marker = self.marker.clone().into_bytes();

        let started = Instant::now();
        thread::Builder::new()
            .name("trace-reader".into())
            .spawn(move || {
                let result = read_until_marker(BufReader::new(file), &marker, &reader_stop);
                // The receiver is gone if the caller already timed out.
                let _ = tx.send(result);
            })
            .map_err(TraceError::ReaderSpawn)?;

        let outcome = rx.recv_timeout(timeout);
        stop.store(true, Ordering::Relaxed);

        match outcome {
            Ok(Ok(found)) => {
                tracing::debug!("trace scan finished after {:?}", started.elapsed());
                Ok(found)
            }
            Ok(Err(e)) => Err(TraceError::ReadError {
                path: self.feed_path.display().to_string(),
                source: e,
            }),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Ok(None),
        }
    }
}

impl Default for TraceVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_PIPE)
    }
}

fn read_until_marker<R: BufRead>(
    mut reader: R,
    marker: &[u8],
    stop: &AtomicBool,
) -> io::Result<Option<String>> {
    let mut line = Vec::new();
    loop {
        if stop.load(Ordering::Relaxed) {
            return Ok(None);
        }
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            thread::sleep(EOF_POLL);
            continue;
        }
        if contains(&line, marker) {
            let text = String::from_utf8_lossy(&line);
            return Ok(Some(text.trim_end().to_string()));
        }
        // Keep a partial line so the rest of it is appended on the next read.
        if line.ends_with(b"\n") {
            line.clear();
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
