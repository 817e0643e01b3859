// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Adapter that reaches pinned maps by invoking `bpftool`.
//!
//! # Design
//!
//! Every operation spawns one `bpftool` child process and waits for it to
//! exit; there is no timeout, so a hung tool hangs the caller. A non-zero
//! exit status is surfaced as [`MapError::ExternalTool`] and never retried.
//!
//! ```text
//! bpftool map update pinned <path> key <hex> value data <hex>
//! bpftool -j map lookup pinned <path> key <hex>
//! ```
//!
//! # Permissions
//!
//! Accessing pinned maps under `/sys/fs/bpf` normally requires root or
//! `CAP_BPF`.

use crate::{decoder, wire, MapError, MapStore};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs `bpftool` map commands against arbitrary pinned paths.
#[derive(Debug, Clone)]
pub struct BpftoolClient {
    tool: String,
}

impl BpftoolClient {
    /// Creates a client for the given executable (name or path).
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Arguments for an update of `key` in the map pinned at `map_path`.
    pub fn update_args(map_path: &Path, key: u32, data: &[u8]) -> Vec<String> {
        vec![
            "map".into(),
            "update".into(),
            "pinned".into(),
            map_path.display().to_string(),
            "key".into(),
            wire::encode_key(key),
            "value".into(),
            "data".into(),
            wire::encode_value(data),
        ]
    }

    /// Arguments for a JSON-mode lookup of `key`.
    pub fn lookup_args(map_path: &Path, key: u32) -> Vec<String> {
        vec![
            "-j".into(),
            "map".into(),
            "lookup".into(),
            "pinned".into(),
            map_path.display().to_string(),
            "key".into(),
            wire::encode_key(key),
        ]
    }

    /// Writes `data` at `key`. Blocks until `bpftool` exits.
    pub fn update(&self, map_path: &Path, key: u32, data: &[u8]) -> Result<(), MapError> {
        self.run(&Self::update_args(map_path, key, data))?;
        tracing::debug!(
            "updated {} at key {key} ({} bytes)",
            map_path.display(),
            data.len()
        );
        Ok(())
    }

    /// Looks up `key` and returns `bpftool`'s JSON output unparsed.
    pub fn lookup(&self, map_path: &Path, key: u32) -> Result<Vec<u8>, MapError> {
        let stdout = self.run(&Self::lookup_args(map_path, key))?;
        tracing::debug!(
            "looked up {} at key {key} ({} bytes of JSON)",
            map_path.display(),
            stdout.len()
        );
        Ok(stdout)
    }

    /// Spawns the tool, waits for it, and returns stdout on success.
    fn run(&self, args: &[String]) -> Result<Vec<u8>, MapError> {
        let output = Command::new(&self.tool)
            .args(args)
            .output()
            .map_err(|e| MapError::Spawn {
                tool: self.tool.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MapError::ExternalTool {
                command: self.command_summary(args),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    /// The command line up to (not including) the hex payload.
    fn command_summary(&self, args: &[String]) -> String {
        let shown: Vec<&str> = args.iter().take(5).map(String::as_str).collect();
        format!("{} {}", self.tool, shown.join(" "))
    }
}

impl Default for BpftoolClient {
    fn default() -> Self {
        Self::new("bpftool")
    }
}

/// A single pinned map reached through [`BpftoolClient`].
#[derive(Debug, Clone)]
pub struct BpftoolMapStore {
    client: BpftoolClient,
    map_path: PathBuf,
    value_size: Option<usize>,
}

impl BpftoolMapStore {
    pub fn new(tool: impl Into<String>, map_path: impl Into<PathBuf>) -> Self {
        Self::with_client(BpftoolClient::new(tool), map_path)
    }

    pub fn with_client(client: BpftoolClient, map_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            map_path: map_path.into(),
            value_size: None,
        }
    }

    /// Rejects updates whose length differs from `size` before spawning.
    pub fn with_value_size(mut self, size: usize) -> Self {
        self.value_size = Some(size);
        self
    }

    pub fn map_path(&self) -> &Path {
        &self.map_path
    }

    /// Looks up `key` and returns the raw JSON response.
    pub fn lookup_raw(&self, key: u32) -> Result<Vec<u8>, MapError> {
        self.client.lookup(&self.map_path, key)
    }
}

impl MapStore for BpftoolMapStore {
    fn update(&self, key: u32, value: &[u8]) -> Result<(), MapError> {
        if let Some(expected) = self.value_size {
            if value.len() != expected {
                return Err(MapError::ValueSize {
                    map: self.describe(),
                    expected,
                    actual: value.len(),
                });
            }
        }
        self.client.update(&self.map_path, key, value)
    }

    fn lookup(&self, key: u32) -> Result<Vec<u8>, MapError> {
        let raw = self.lookup_raw(key)?;
        decoder::parse_lookup_response(&raw)
    }

    fn describe(&self) -> String {
        self.map_path.display().to_string()
    }
}
