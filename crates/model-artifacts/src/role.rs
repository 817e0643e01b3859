// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The four parameter tensors of the network.

use crate::ModelDims;
use tensor_core::{DType, Shape};

/// Identifies one of the four parameter tensors.
///
/// Each role fixes the file suffix, element type, expected shape, and the
/// name of the kernel map the tensor is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorRole {
    HiddenWeights,
    HiddenBias,
    OutputWeights,
    OutputBias,
}

impl TensorRole {
    /// All roles in export order.
    pub const ALL: [TensorRole; 4] = [
        TensorRole::HiddenWeights,
        TensorRole::HiddenBias,
        TensorRole::OutputWeights,
        TensorRole::OutputBias,
    ];

    /// Fixed file suffix appended to the caller's prefix.
    pub fn file_suffix(self) -> &'static str {
        match self {
            TensorRole::HiddenWeights => "hweights8.bin",
            TensorRole::HiddenBias => "hbias32.bin",
            TensorRole::OutputWeights => "outweights8.bin",
            TensorRole::OutputBias => "outbias32.bin",
        }
    }

    /// Name of the kernel map that holds this tensor.
    pub fn map_name(self) -> &'static str {
        match self {
            TensorRole::HiddenWeights => "hidden_weights",
            TensorRole::HiddenBias => "hidden_bias",
            TensorRole::OutputWeights => "output_weights",
            TensorRole::OutputBias => "output_bias",
        }
    }

    pub fn dtype(self) -> DType {
        match self {
            TensorRole::HiddenWeights | TensorRole::OutputWeights => DType::I8,
            TensorRole::HiddenBias | TensorRole::OutputBias => DType::I32,
        }
    }

    /// Expected shape under the given dimensions.
    pub fn shape(self, dims: &ModelDims) -> Shape {
        match self {
            TensorRole::HiddenWeights => Shape::matrix(dims.hidden, dims.input),
            TensorRole::HiddenBias => Shape::vector(dims.hidden),
            TensorRole::OutputWeights => Shape::matrix(dims.output, dims.hidden),
            TensorRole::OutputBias => Shape::vector(dims.output),
        }
    }

    /// Expected file length in bytes.
    pub fn size_bytes(self, dims: &ModelDims) -> usize {
        self.shape(dims).size_bytes(self.dtype())
    }

    pub fn is_weight(self) -> bool {
        self.dtype() == DType::I8
    }
}

impl std::fmt::Display for TensorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.map_name())
    }
}
