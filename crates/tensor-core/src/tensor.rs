// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core quantized tensor type.

use crate::{DType, QuantParams, Shape, TensorError};

/// An owned, shaped tensor of fixed-width integers.
///
/// # Memory Layout
/// Data is held in its canonical encoded form: a flat row-major byte buffer
/// with little-endian multi-byte elements. Encoding is therefore a copy, and
/// typed access decodes on demand instead of reinterpreting memory.
///
/// The constructor invariant is `data.len() == shape.size_bytes(dtype)`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedTensor {
    shape: Shape,
    dtype: DType,
    data: Vec<u8>,
    quant: Option<QuantParams>,
}

impl QuantizedTensor {
    /// Creates a tensor filled with zeros.
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let size = shape.size_bytes(dtype);
        Self {
            shape,
            dtype,
            data: vec![0u8; size],
            quant: None,
        }
    }

    /// Creates a tensor from canonical bytes.
    ///
    /// Returns [`TensorError::ShapeMismatch`] if the buffer size does not
    /// equal `shape.size_bytes(dtype)`.
    pub fn from_bytes(shape: Shape, dtype: DType, data: Vec<u8>) -> Result<Self, TensorError> {
        let expected = shape.size_bytes(dtype);
        if data.len() != expected {
            return Err(TensorError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape,
            dtype,
            data,
            quant: None,
        })
    }

    /// Creates a `u8` tensor from raw samples.
    pub fn from_u8(shape: Shape, values: &[u8]) -> Result<Self, TensorError> {
        Self::from_bytes(shape, DType::U8, values.to_vec())
    }

    /// Creates an `i8` tensor from quantized weights.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{QuantizedTensor, Shape};
    /// let w = QuantizedTensor::from_i8(Shape::matrix(2, 2), &[1, -1, 127, -128]).unwrap();
    /// assert_eq!(w.as_bytes(), &[0x01, 0xff, 0x7f, 0x80]);
    /// ```
    pub fn from_i8(shape: Shape, values: &[i8]) -> Result<Self, TensorError> {
        let bytes = values.iter().map(|v| *v as u8).collect();
        Self::from_bytes(shape, DType::I8, bytes)
    }

    /// Creates an `i32` tensor, encoding each element little-endian.
    pub fn from_i32(shape: Shape, values: &[i32]) -> Result<Self, TensorError> {
        Self::from_bytes(shape, DType::I32, crate::codec::encode_i32_le(values))
    }

    /// Attaches quantization parameters after checking they fit the shape.
    pub fn with_quant(mut self, quant: QuantParams) -> Result<Self, TensorError> {
        quant.validate_for(&self.shape)?;
        self.quant = Some(quant);
        Ok(self)
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's element type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the attached quantization parameters, if any.
    pub fn quant(&self) -> Option<&QuantParams> {
        self.quant.as_ref()
    }

    /// Returns the canonical byte buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the tensor and returns its byte buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the encoded size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Decodes the buffer as `i8` values.
    pub fn to_i8_vec(&self) -> Result<Vec<i8>, TensorError> {
        self.expect_dtype(DType::I8)?;
        Ok(self.data.iter().map(|b| *b as i8).collect())
    }

    /// Decodes the buffer as little-endian `i32` values.
    pub fn to_i32_vec(&self) -> Result<Vec<i32>, TensorError> {
        self.expect_dtype(DType::I32)?;
        crate::codec::decode_i32_le(&self.data)
    }

    /// Widens every element to `i32`, whatever the storage type.
    ///
    /// `u8` is zero-extended and `i8` sign-extended, the same promotion the
    /// execution surface applies before accumulating.
    pub fn to_widened(&self) -> Vec<i32> {
        match self.dtype {
            DType::U8 => self.data.iter().map(|b| *b as i32).collect(),
            DType::I8 => self.data.iter().map(|b| *b as i8 as i32).collect(),
            DType::I32 => self
                .data
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        }
    }

    fn expect_dtype(&self, expected: DType) -> Result<(), TensorError> {
        if self.dtype != expected {
            return Err(TensorError::DTypeMismatch {
                expected,
                actual: self.dtype,
            });
        }
        Ok(())
    }
}
