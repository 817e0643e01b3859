// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! Host side of the quantized-model exchange with the kernel-resident
//! execution surface.
//!
//! The runtime takes:
//! - An [`InputBuffer`] of exactly `dims.input` grayscale samples.
//! - A pair of [`map_ipc::MapStore`]s for the input and output maps.
//! - An [`trace_monitor::ExecutionTrigger`] and, optionally, a trace verifier.
//!
//! And runs one request: write the input, fire the surface, wait, read the
//! logits, pick the arg-max. [`WeightLoader`] separately pushes the four
//! parameter tensors into their maps before any request is made.
//!
//! # Ordering
//! The surface publishes no completion signal. The settle wait between
//! trigger and lookup ([`SettlePolicy`]) narrows the race with the surface
//! but does not close it.
//!
//! # Blocking I/O
//! Everything runs on the calling thread except the trace-feed scan, which
//! uses a detached reader thread so it can be abandoned at its deadline.

mod config;
mod error;
mod input;
mod metrics;
mod pipeline;
mod settle;
mod weight_loader;

pub use config::{InferenceConfig, SettleMode, WeightMapPaths};
pub use error::RuntimeError;
pub use input::InputBuffer;
pub use metrics::{InferenceMetrics, Stage};
pub use pipeline::{BpftoolPipeline, InferenceOutput, InferencePipeline};
pub use settle::{SettleOutcome, SettlePolicy};
pub use weight_loader::{UploadedTensor, WeightLoader, WeightSource};
