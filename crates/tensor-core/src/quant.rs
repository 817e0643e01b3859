// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Affine quantization parameters.
//!
//! A real value `r` is represented by an integer `q` as
//! `r = scale * (q - zero_point)`. Weights use one scale per output channel
//! (symmetric, zero-point 0); biases carry a single scale.
//!
//! These parameters are never sent to the execution surface at runtime. They
//! travel only in the artifact manifest so a mismatch can be spotted offline.

use crate::{Shape, TensorError};

/// Scale and zero-point for a quantized tensor.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuantParams {
    /// One scale for the whole tensor, or one per output channel.
    pub scales: Vec<f32>,
    /// Integer offset subtracted before scaling.
    #[serde(default)]
    pub zero_point: i32,
}

impl QuantParams {
    /// Per-tensor parameters.
    pub fn per_tensor(scale: f32, zero_point: i32) -> Self {
        Self {
            scales: vec![scale],
            zero_point,
        }
    }

    /// Symmetric per-output-channel parameters (zero-point 0).
    pub fn per_channel(scales: Vec<f32>) -> Self {
        Self {
            scales,
            zero_point: 0,
        }
    }

    /// Returns `true` if more than one scale is stored.
    pub fn is_per_channel(&self) -> bool {
        self.scales.len() > 1
    }

    /// Returns the scale that applies to `channel`.
    ///
    /// Per-tensor parameters return their single scale for every channel.
    pub fn scale_for(&self, channel: usize) -> Option<f32> {
        if self.scales.len() == 1 {
            self.scales.first().copied()
        } else {
            self.scales.get(channel).copied()
        }
    }

    /// Maps a quantized value back to a real value.
    pub fn dequantize(&self, channel: usize, q: i32) -> Option<f32> {
        let scale = self.scale_for(channel)?;
        Some(scale * (q as i64 - self.zero_point as i64) as f32)
    }

    /// Checks that these parameters fit a tensor of the given shape.
    ///
    /// The scale count must be 1 or equal the leading (output-channel)
    /// dimension, and every scale must be finite and positive.
    pub fn validate_for(&self, shape: &Shape) -> Result<(), TensorError> {
        if self.scales.is_empty() {
            return Err(TensorError::InvalidQuantParams("no scales given".into()));
        }
        let channels = shape.channels();
        if self.scales.len() != 1 && self.scales.len() != channels {
            return Err(TensorError::InvalidQuantParams(format!(
                "{} scales for {} output channels of shape {shape}",
                self.scales.len(),
                channels,
            )));
        }
        if let Some(bad) = self.scales.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(TensorError::InvalidQuantParams(format!(
                "scale {bad} is not a finite positive number"
            )));
        }
        Ok(())
    }
}
