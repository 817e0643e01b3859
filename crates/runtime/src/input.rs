// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Input preparation: image → grayscale 28×28 → 784 `u8` samples.

use crate::RuntimeError;
use image::imageops::FilterType;
use model_artifacts::ModelDims;
use std::path::Path;

/// A validated input record, exactly `dims.input` bytes, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBuffer {
    samples: Vec<u8>,
}

impl InputBuffer {
    /// Wraps raw samples, rejecting any length other than `dims.input`.
    pub fn from_samples(samples: Vec<u8>, dims: &ModelDims) -> Result<Self, RuntimeError> {
        if samples.len() != dims.input {
            return Err(RuntimeError::InputShape {
                expected: dims.input,
                actual: samples.len(),
            });
        }
        Ok(Self { samples })
    }

    /// Decodes an image file, converts it to 8-bit grayscale and resizes it
    /// to 28×28.
    pub fn from_image_path(path: &Path, dims: &ModelDims) -> Result<Self, RuntimeError> {
        let img = image::open(path).map_err(|e| RuntimeError::Image {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_image(&img, dims)
    }

    /// Converts an already decoded image.
    pub fn from_image(img: &image::DynamicImage, dims: &ModelDims) -> Result<Self, RuntimeError> {
        let side = ModelDims::IMAGE_SIDE;
        let gray = img.to_luma8();
        let resized = if gray.dimensions() == (side, side) {
            gray
        } else {
            image::imageops::resize(&gray, side, side, FilterType::CatmullRom)
        };
        tracing::debug!(
            "input image {}x{} -> {side}x{side} grayscale",
            img.width(),
            img.height()
        );
        Self::from_samples(resized.into_raw(), dims)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean intensity, handy as a sanity check on an unexpectedly blank image.
    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.samples.iter().map(|&s| s as u64).sum();
        sum as f32 / self.samples.len() as f32
    }
}
