// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON sidecar describing an exported artifact set.
//!
//! The binary files carry no header, and the execution surface bakes the
//! quantization parameters in at build time. The manifest records what the
//! files were exported with so a later mismatch can be detected offline.
//!
//! # Format
//! ```json
//! {
//!   "format_version": 1,
//!   "dims": { "input": 784, "hidden": 32, "output": 10 },
//!   "tensors": [
//!     {
//!       "role": "hidden_weights",
//!       "file": "hweights8.bin",
//!       "dtype": "i8",
//!       "shape": [32, 784],
//!       "size_bytes": 25088,
//!       "quant": { "scales": [0.0041, ...], "zero_point": 0 }
//!     },
//!     ...
//!   ]
//! }
//! ```

use crate::artifact::ArtifactState;
use crate::{ArtifactError, ModelArtifactSet, ModelDims, TensorRole};
use std::path::{Path, PathBuf};
use tensor_core::{DType, QuantParams, Shape};

/// Suffix of the manifest file under an artifact prefix.
pub const MANIFEST_SUFFIX: &str = "manifest.json";

/// Current manifest layout version.
const FORMAT_VERSION: u32 = 1;

/// Top-level manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    pub dims: ModelDims,
    pub tensors: Vec<ManifestTensor>,
}

/// One tensor entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestTensor {
    pub role: TensorRole,
    /// File name relative to the prefix.
    pub file: String,
    pub dtype: DType,
    pub shape: Shape,
    pub size_bytes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quant: Option<QuantParams>,
}

impl ArtifactManifest {
    /// Describes an artifact set.
    pub fn from_set<S: ArtifactState>(set: &ModelArtifactSet<S>) -> Self {
        let tensors = set
            .iter()
            .map(|(role, t)| ManifestTensor {
                role,
                file: role.file_suffix().to_string(),
                dtype: t.dtype(),
                shape: t.shape().clone(),
                size_bytes: t.size_bytes(),
                quant: t.quant().cloned(),
            })
            .collect();
        Self {
            format_version: FORMAT_VERSION,
            dims: *set.dims(),
            tensors,
        }
    }

    /// Path of the manifest under a prefix.
    pub fn path_for(prefix: &str) -> PathBuf {
        PathBuf::from(format!("{prefix}{MANIFEST_SUFFIX}"))
    }

    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path).map_err(|e| ArtifactError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialises the manifest to pretty JSON.
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the manifest to `<prefix>manifest.json` and returns its path.
    pub fn write(&self, prefix: &str) -> Result<PathBuf, ArtifactError> {
        let path = Self::path_for(prefix);
        let json = self.to_json()?;
        std::fs::write(&path, json).map_err(|e| ArtifactError::Write {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// Returns the entry for a role.
    pub fn tensor(&self, role: TensorRole) -> Option<&ManifestTensor> {
        self.tensors.iter().find(|t| t.role == role)
    }

    /// Checks that the manifest is internally consistent and matches `dims`.
    ///
    /// Checks:
    /// - The format version is understood.
    /// - The recorded dims equal `dims`.
    /// - Every role is present once with the expected dtype, shape, and size.
    pub fn check_against(&self, dims: &ModelDims) -> Result<(), ArtifactError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ArtifactError::ManifestMismatch(format!(
                "unsupported format_version {}",
                self.format_version
            )));
        }
        if &self.dims != dims {
            return Err(ArtifactError::ManifestMismatch(format!(
                "exported for {} but configured for {dims}",
                self.dims
            )));
        }
        if self.tensors.len() != TensorRole::ALL.len() {
            return Err(ArtifactError::ManifestMismatch(format!(
                "expected 4 tensor entries, found {}",
                self.tensors.len()
            )));
        }
        for role in TensorRole::ALL {
            let entry = self.tensor(role).ok_or_else(|| {
                ArtifactError::ManifestMismatch(format!("missing entry for {role}"))
            })?;
            let shape = role.shape(dims);
            if entry.dtype != role.dtype()
                || entry.shape != shape
                || entry.size_bytes != role.size_bytes(dims)
            {
                return Err(ArtifactError::ManifestMismatch(format!(
                    "{role}: recorded {} {} ({} bytes), expected {} {shape} ({} bytes)",
                    entry.dtype,
                    entry.shape,
                    entry.size_bytes,
                    role.dtype(),
                    role.size_bytes(dims),
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::QuantizedTensor;

    fn quantized_set() -> ModelArtifactSet<crate::artifact::Validated> {
        let dims = ModelDims::new(4, 2, 2);
        let hw = QuantizedTensor::from_i8(Shape::matrix(2, 4), &[1; 8])
            .unwrap()
            .with_quant(QuantParams::per_channel(vec![0.5, 0.25]))
            .unwrap();
        let hb = QuantizedTensor::from_i32(Shape::vector(2), &[3, 4]).unwrap();
        let ow = QuantizedTensor::from_i8(Shape::matrix(2, 2), &[1; 4]).unwrap();
        let ob = QuantizedTensor::from_i32(Shape::vector(2), &[0, 0]).unwrap();
        ModelArtifactSet::new(dims, hw, hb, ow, ob).validate().unwrap()
    }

    #[test]
    fn test_from_set_records_quant() {
        let m = ArtifactManifest::from_set(&quantized_set());
        let hw = m.tensor(TensorRole::HiddenWeights).unwrap();
        assert_eq!(hw.file, "hweights8.bin");
        assert_eq!(hw.quant.as_ref().unwrap().scales, vec![0.5, 0.25]);
        assert!(m.tensor(TensorRole::OutputBias).unwrap().quant.is_none());
    }

    #[test]
    fn test_json_roundtrip_and_check() {
        let m = ArtifactManifest::from_set(&quantized_set());
        let json = m.to_json().unwrap();
        assert!(json.contains("\"role\": \"hidden_weights\""));
        assert!(json.contains("\"dtype\": \"i8\""));
        let back = ArtifactManifest::from_json(&json).unwrap();
        back.check_against(&ModelDims::new(4, 2, 2)).unwrap();
    }

    #[test]
    fn test_check_against_other_dims() {
        let m = ArtifactManifest::from_set(&quantized_set());
        let err = m.check_against(&ModelDims::default()).unwrap_err();
        assert!(matches!(err, ArtifactError::ManifestMismatch(_)));
    }

    #[test]
    fn test_check_detects_tampered_entry() {
        let mut m = ArtifactManifest::from_set(&quantized_set());
        m.tensors[1].size_bytes = 7;
        assert!(m.check_against(&ModelDims::new(4, 2, 2)).is_err());
        m.tensors.pop();
        assert!(m.check_against(&ModelDims::new(4, 2, 2)).is_err());
    }

    #[test]
    fn test_unknown_version() {
        let mut m = ArtifactManifest::from_set(&quantized_set());
        m.format_version = 9;
        assert!(m.check_against(&ModelDims::new(4, 2, 2)).is_err());
    }
}
