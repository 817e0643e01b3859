// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Quantized tensor types and the canonical binary codec shared by the
//! exporter, the map client, and the output decoder.
//!
//! This crate provides:
//! - [`QuantizedTensor`]: a shaped, fixed-width integer buffer with optional
//!   quantization parameters.
//! - [`Shape`]: runtime shape descriptors.
//! - [`DType`]: supported element types (`u8`, `i8`, `i32`).
//! - [`QuantParams`]: per-tensor or per-output-channel scale plus zero-point.
//! - [`codec`]: `encode` / `decode` between tensors and flat byte buffers.
//!
//! # Wire Format
//! Tensors are stored as a flat, headerless, row-major byte buffer. Multi-byte
//! elements are little-endian. Shape and dtype are never embedded; both sides
//! agree on them out-of-band.
//!
//! ```
//! use tensor_core::{codec, DType, QuantizedTensor, Shape};
//!
//! let bias = QuantizedTensor::from_i32(Shape::vector(3), &[1, -2, 300]).unwrap();
//! let bytes = codec::encode(&bias);
//! assert_eq!(bytes.len(), 12);
//! let back = codec::decode(&bytes, Shape::vector(3), DType::I32).unwrap();
//! assert_eq!(back.to_i32_vec().unwrap(), vec![1, -2, 300]);
//! ```

pub mod codec;
mod dtype;
mod error;
mod quant;
mod shape;
mod tensor;

pub use dtype::DType;
pub use error::TensorError;
pub use quant::QuantParams;
pub use shape::Shape;
pub use tensor::QuantizedTensor;
