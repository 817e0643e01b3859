// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Network dimensions shared by every stage of the exchange.

use crate::ArtifactError;

/// Sizes of the two-layer perceptron the execution surface was built for.
///
/// These are agreed out-of-band: the artifacts carry no header, so both the
/// exporter and the surface must use the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModelDims {
    /// Input samples (28 × 28 grayscale pixels).
    pub input: usize,
    /// Hidden units.
    pub hidden: usize,
    /// Output classes.
    pub output: usize,
}

impl ModelDims {
    /// Width of the reference input image.
    pub const IMAGE_SIDE: u32 = 28;

    pub fn new(input: usize, hidden: usize, output: usize) -> Self {
        Self {
            input,
            hidden,
            output,
        }
    }

    /// Byte length of the input map value (one `u8` per sample).
    pub fn input_bytes(&self) -> usize {
        self.input
    }

    /// Byte length of the output map value (one `i32` logit per class).
    pub fn output_bytes(&self) -> usize {
        self.output * 4
    }

    /// Rejects zero-sized layers.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.input == 0 || self.hidden == 0 || self.output == 0 {
            return Err(ArtifactError::InvalidDims(format!(
                "all dimensions must be non-zero, got {self}"
            )));
        }
        Ok(())
    }
}

impl Default for ModelDims {
    fn default() -> Self {
        Self {
            input: 784,
            hidden: 32,
            output: 10,
        }
    }
}

impl std::fmt::Display for ModelDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}→{}→{}", self.input, self.hidden, self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mnist() {
        let d = ModelDims::default();
        assert_eq!(d.input, 784);
        assert_eq!(d.input as u32, ModelDims::IMAGE_SIDE * ModelDims::IMAGE_SIDE);
        assert_eq!(d.input_bytes(), 784);
        assert_eq!(d.output_bytes(), 40);
    }

    #[test]
    fn test_validate_zero() {
        assert!(ModelDims::new(784, 0, 10).validate().is_err());
        assert!(ModelDims::default().validate().is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(ModelDims::default().to_string(), "784→32→10");
    }
}
