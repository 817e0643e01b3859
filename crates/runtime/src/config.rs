// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pipeline configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! input_map = "/sys/fs/bpf/mnist_input"
//! output_map = "/sys/fs/bpf/mnist_output"
//! trace_pipe = "/sys/kernel/debug/tracing/trace_pipe"
//! bpftool = "bpftool"
//! trigger_command = []
//! trace_timeout_ms = 1000
//! settle = "fixed"
//! settle_ms = 100
//! poll_attempts = 10
//! verify_trace = true
//!
//! [dims]
//! input = 784
//! hidden = 32
//! output = 10
//!
//! [weight_maps]
//! hidden_weights = "/sys/fs/bpf/hidden_weights"
//! hidden_bias = "/sys/fs/bpf/hidden_bias"
//! output_weights = "/sys/fs/bpf/output_weights"
//! output_bias = "/sys/fs/bpf/output_bias"
//! ```
//!
//! Every field is optional; missing fields take the values shown. Unknown
//! fields are rejected. Both maps are always addressed at
//! [`map_ipc::SLOT_KEY`], the only slot the surface reads and writes.

use crate::{RuntimeError, SettlePolicy};
use map_ipc::{BpftoolClient, BpftoolMapStore};
use model_artifacts::{ModelDims, TensorRole};
use std::path::{Path, PathBuf};
use std::time::Duration;
use trace_monitor::{CommandTrigger, ExecutionTrigger, SyscallTrigger};

/// Where the four parameter maps are pinned.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WeightMapPaths {
    pub hidden_weights: PathBuf,
    pub hidden_bias: PathBuf,
    pub output_weights: PathBuf,
    pub output_bias: PathBuf,
}

impl WeightMapPaths {
    pub fn path_for(&self, role: TensorRole) -> &Path {
        match role {
            TensorRole::HiddenWeights => &self.hidden_weights,
            TensorRole::HiddenBias => &self.hidden_bias,
            TensorRole::OutputWeights => &self.output_weights,
            TensorRole::OutputBias => &self.output_bias,
        }
    }
}

impl Default for WeightMapPaths {
    fn default() -> Self {
        let pinned = |role: TensorRole| PathBuf::from(format!("/sys/fs/bpf/{}", role.map_name()));
        Self {
            hidden_weights: pinned(TensorRole::HiddenWeights),
            hidden_bias: pinned(TensorRole::HiddenBias),
            output_weights: pinned(TensorRole::OutputWeights),
            output_bias: pinned(TensorRole::OutputBias),
        }
    }
}

/// Settle strategy name as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettleMode {
    /// Sleep `settle_ms`.
    Fixed,
    /// Poll the output map every `settle_ms`, up to `poll_attempts` times.
    Poll,
}

/// Configuration for the inference pipeline and weight upload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceConfig {
    /// Pinned path of the input map.
    pub input_map: PathBuf,
    /// Pinned path of the output map.
    pub output_map: PathBuf,
    /// Kernel trace feed scanned for the execution marker.
    pub trace_pipe: PathBuf,
    /// Map-store tool, looked up on `PATH` unless absolute.
    pub bpftool: String,
    /// Program and arguments run to fire the surface; empty means a
    /// `getpid` syscall.
    pub trigger_command: Vec<String>,
    /// How long to scan the trace feed.
    pub trace_timeout_ms: u64,
    pub settle: SettleMode,
    pub settle_ms: u64,
    pub poll_attempts: u32,
    /// Whether to scan the trace feed at all.
    pub verify_trace: bool,
    pub dims: ModelDims,
    pub weight_maps: WeightMapPaths,
}

impl InferenceConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Rejects configurations no pipeline can run with.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        self.dims
            .validate()
            .map_err(|e| RuntimeError::ConfigError(e.to_string()))?;
        if self.bpftool.trim().is_empty() {
            return Err(RuntimeError::ConfigError("bpftool must not be empty".into()));
        }
        if self
            .trigger_command
            .first()
            .is_some_and(|program| program.trim().is_empty())
        {
            return Err(RuntimeError::ConfigError(
                "trigger_command must start with a program".into(),
            ));
        }
        if self.settle == SettleMode::Poll && self.poll_attempts == 0 {
            return Err(RuntimeError::ConfigError(
                "poll_attempts must be at least 1 when settle = \"poll\"".into(),
            ));
        }
        Ok(())
    }

    pub fn trace_timeout(&self) -> Duration {
        Duration::from_millis(self.trace_timeout_ms)
    }

    /// The settle policy described by `settle`, `settle_ms` and `poll_attempts`.
    pub fn settle_policy(&self) -> SettlePolicy {
        let interval = Duration::from_millis(self.settle_ms);
        match self.settle {
            SettleMode::Fixed if self.settle_ms == 0 => SettlePolicy::Immediate,
            SettleMode::Fixed => SettlePolicy::Fixed(interval),
            SettleMode::Poll => SettlePolicy::PollUntilChanged {
                interval,
                max_attempts: self.poll_attempts,
            },
        }
    }

    /// The trigger described by `trigger_command`.
    pub fn trigger(&self) -> Box<dyn ExecutionTrigger> {
        match self.trigger_command.split_first() {
            Some((program, args)) => Box::new(CommandTrigger::new(program).with_args(args)),
            None => Box::new(SyscallTrigger),
        }
    }

    pub fn bpftool_client(&self) -> BpftoolClient {
        BpftoolClient::new(self.bpftool.clone())
    }

    /// Store for the input map; rejects payloads that are not `dims.input` bytes.
    pub fn input_store(&self) -> BpftoolMapStore {
        BpftoolMapStore::with_client(self.bpftool_client(), &self.input_map)
            .with_value_size(self.dims.input_bytes())
    }

    pub fn output_store(&self) -> BpftoolMapStore {
        BpftoolMapStore::with_client(self.bpftool_client(), &self.output_map)
    }

    /// Store for one parameter map; rejects payloads of the wrong size.
    pub fn weight_store(&self, role: TensorRole) -> BpftoolMapStore {
        BpftoolMapStore::with_client(self.bpftool_client(), self.weight_maps.path_for(role))
            .with_value_size(role.size_bytes(&self.dims))
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            input_map: PathBuf::from("/sys/fs/bpf/mnist_input"),
            output_map: PathBuf::from("/sys/fs/bpf/mnist_output"),
            trace_pipe: PathBuf::from(trace_monitor::DEFAULT_TRACE_PIPE),
            bpftool: "bpftool".to_string(),
            trigger_command: Vec::new(),
            trace_timeout_ms: 1000,
            settle: SettleMode::Fixed,
            settle_ms: 100,
            poll_attempts: 10,
            verify_trace: true,
            dims: ModelDims::default(),
            weight_maps: WeightMapPaths::default(),
        }
    }
}
