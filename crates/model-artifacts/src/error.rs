// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for artifact export and loading.

use crate::TensorRole;
use std::path::PathBuf;

/// Errors that can occur when building, writing, or reading artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// A tensor could not be built or decoded.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    /// A tensor's shape or dtype does not fit the model dimensions.
    #[error("invalid {role} tensor: {detail}")]
    InvalidTensor { role: TensorRole, detail: String },

    /// The model dimensions themselves are unusable.
    #[error("invalid model dimensions: {0}")]
    InvalidDims(String),

    /// An artifact file could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact file exists but has the wrong length.
    #[error("'{}' has {actual} bytes, expected {expected}", path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// A manifest or model document is not valid JSON for its schema.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A manifest disagrees with the dimensions it is checked against.
    #[error("manifest mismatch: {0}")]
    ManifestMismatch(String),
}
