// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The four-tensor parameter set of a quantized model.
//!
//! # Type-State Pattern
//!
//! ```text
//! ModelArtifactSet<Unchecked> : tensors assembled, shapes not yet checked.
//!       │  .validate()
//!       ▼
//! ModelArtifactSet<Validated> : dtypes and shapes match the dimensions.
//! ```
//!
//! The exporter and the weight loader only accept `Validated` sets, so a
//! wrongly shaped tensor can never reach disk or a kernel map.

use crate::{ArtifactError, ModelDims, TensorRole};
use std::fmt;
use tensor_core::{DType, QuantizedTensor};

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: tensors assembled but not validated.
#[derive(Debug, Clone)]
pub struct Unchecked;

/// Marker: tensors validated against the model dimensions.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for artifact-set states.
pub trait ArtifactState: fmt::Debug + Clone {}
impl ArtifactState for Unchecked {}
impl ArtifactState for Validated {}

// ── ModelArtifactSet ───────────────────────────────────────────────

/// First- and second-layer weights and biases of the network.
///
/// Created once at export time and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ModelArtifactSet<S: ArtifactState = Unchecked> {
    dims: ModelDims,
    hidden_weights: QuantizedTensor,
    hidden_bias: QuantizedTensor,
    output_weights: QuantizedTensor,
    output_bias: QuantizedTensor,
    _state: std::marker::PhantomData<S>,
}

impl ModelArtifactSet<Unchecked> {
    /// Assembles a set in the `Unchecked` state.
    pub fn new(
        dims: ModelDims,
        hidden_weights: QuantizedTensor,
        hidden_bias: QuantizedTensor,
        output_weights: QuantizedTensor,
        output_bias: QuantizedTensor,
    ) -> Self {
        Self {
            dims,
            hidden_weights,
            hidden_bias,
            output_weights,
            output_bias,
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the set and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - Dimensions are non-zero.
    /// - Each tensor has its role's dtype (`i8` weights, `i32` biases).
    /// - Hidden weights are `(hidden, input)`, output weights are
    ///   `(output, hidden)`, and bias lengths equal the layer's outputs.
    pub fn validate(self) -> Result<ModelArtifactSet<Validated>, ArtifactError> {
        self.dims.validate()?;

        for role in TensorRole::ALL {
            let tensor = self.tensor(role);
            if tensor.dtype() != role.dtype() {
                return Err(ArtifactError::InvalidTensor {
                    role,
                    detail: format!("dtype {} but expected {}", tensor.dtype(), role.dtype()),
                });
            }
            let expected = role.shape(&self.dims);
            if tensor.shape() != &expected {
                return Err(ArtifactError::InvalidTensor {
                    role,
                    detail: format!("shape {} but expected {expected}", tensor.shape()),
                });
            }
        }

        Ok(ModelArtifactSet {
            dims: self.dims,
            hidden_weights: self.hidden_weights,
            hidden_bias: self.hidden_bias,
            output_weights: self.output_weights,
            output_bias: self.output_bias,
            _state: std::marker::PhantomData,
        })
    }
}

impl<S: ArtifactState> ModelArtifactSet<S> {
    /// Returns the dimensions the set was built for.
    pub fn dims(&self) -> &ModelDims {
        &self.dims
    }

    /// Returns the tensor for a role.
    pub fn tensor(&self, role: TensorRole) -> &QuantizedTensor {
        match role {
            TensorRole::HiddenWeights => &self.hidden_weights,
            TensorRole::HiddenBias => &self.hidden_bias,
            TensorRole::OutputWeights => &self.output_weights,
            TensorRole::OutputBias => &self.output_bias,
        }
    }

    /// Iterates over `(role, tensor)` pairs in export order.
    pub fn iter(&self) -> impl Iterator<Item = (TensorRole, &QuantizedTensor)> {
        TensorRole::ALL.into_iter().map(move |r| (r, self.tensor(r)))
    }
}

impl ModelArtifactSet<Validated> {
    /// Builds a placeholder set with every weight and bias set to a constant.
    ///
    /// Used when real artifacts are missing so the maps can still be
    /// populated; predictions from such a set are meaningless.
    pub fn placeholder(dims: ModelDims, weight: i8, bias: i32) -> Result<Self, ArtifactError> {
        let fill = |role: TensorRole| -> Result<QuantizedTensor, ArtifactError> {
            let shape = role.shape(&dims);
            let n = shape.num_elements();
            let t = match role.dtype() {
                DType::I8 => QuantizedTensor::from_i8(shape, &vec![weight; n])?,
                _ => QuantizedTensor::from_i32(shape, &vec![bias; n])?,
            };
            Ok(t)
        };
        ModelArtifactSet::new(
            dims,
            fill(TensorRole::HiddenWeights)?,
            fill(TensorRole::HiddenBias)?,
            fill(TensorRole::OutputWeights)?,
            fill(TensorRole::OutputBias)?,
        )
        .validate()
    }

    /// Total encoded size of all four tensors.
    pub fn total_bytes(&self) -> usize {
        self.iter().map(|(_, t)| t.size_bytes()).sum()
    }

    /// Returns a one-line description of the set.
    pub fn summary(&self) -> String {
        let quantized = self.iter().filter(|(_, t)| t.quant().is_some()).count();
        format!(
            "artifact set {}: {} bytes, {}/4 tensors carry quantization parameters",
            self.dims,
            self.total_bytes(),
            quantized,
        )
    }
}
