// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the inference pipeline.

use model_artifacts::TensorRole;

/// Errors that can occur while preparing input, exchanging data with the
/// execution surface, or uploading parameters.
///
/// Every variant is fatal for the request it occurred in. Trace verification
/// failures never surface here; they are logged and the request continues.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The input does not have exactly the expected number of samples.
    /// Raised before any map I/O.
    #[error("input has {actual} samples, expected {expected}")]
    InputShape { expected: usize, actual: usize },

    /// The input image could not be opened or decoded.
    #[error("failed to load image '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// A map update or lookup failed.
    #[error("map error: {0}")]
    Map(#[from] map_ipc::MapError),

    /// Uploading a parameter tensor to its weight map failed.
    #[error("failed to upload {role} parameters: {source}")]
    WeightUpload {
        role: TensorRole,
        #[source]
        source: map_ipc::MapError,
    },

    /// The execution trigger failed to fire.
    #[error("trigger error: {0}")]
    Trigger(#[from] trace_monitor::TraceError),

    /// Artifact loading or validation failed.
    #[error("artifact error: {0}")]
    Artifact(#[from] model_artifacts::ArtifactError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
