// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Canonical tensor encoding.
//!
//! `encode` and `decode` are pure and symmetric: for any tensor `t`,
//! `decode(&encode(&t), t.shape().clone(), t.dtype())` yields the same data.
//! Quantization parameters are not part of the wire format and are dropped.

use crate::{DType, QuantizedTensor, Shape, TensorError};

/// Encodes a tensor as a flat, headerless, row-major byte buffer.
pub fn encode(tensor: &QuantizedTensor) -> Vec<u8> {
    tensor.as_bytes().to_vec()
}

/// Decodes a flat byte buffer into a tensor of the given shape and dtype.
///
/// Fails with [`TensorError::ShapeMismatch`] unless
/// `bytes.len() == shape.num_elements() * dtype.size_bytes()`.
pub fn decode(bytes: &[u8], shape: Shape, dtype: DType) -> Result<QuantizedTensor, TensorError> {
    QuantizedTensor::from_bytes(shape, dtype, bytes.to_vec())
}

/// Encodes `i32` values as consecutive little-endian words.
pub fn encode_i32_le(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decodes consecutive little-endian `i32` words.
///
/// The buffer length must be a multiple of 4.
pub fn decode_i32_le(bytes: &[u8]) -> Result<Vec<i32>, TensorError> {
    if bytes.len() % 4 != 0 {
        return Err(TensorError::ShapeMismatch {
            expected: bytes.len() - bytes.len() % 4,
            actual: bytes.len(),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
