// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor construction and coding.

use crate::DType;

/// Errors that can occur when building, encoding, or decoding tensors.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The byte length does not equal element count × element width.
    #[error("shape mismatch: expected {expected} bytes, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A typed accessor was used on a tensor of a different dtype.
    #[error("dtype mismatch: expected {expected:?}, found {actual:?}")]
    DTypeMismatch { expected: DType, actual: DType },

    /// Quantization parameters do not fit the tensor they are attached to.
    #[error("invalid quantization parameters: {0}")]
    InvalidQuantParams(String),
}
