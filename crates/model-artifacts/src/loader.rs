// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reads an exported artifact set back from disk.
//!
//! Since the files carry no header, the only integrity check available is the
//! exact byte length implied by the configured [`ModelDims`]. A short or long
//! file is rejected rather than truncated or zero-padded.
//!
//! If a manifest sidecar sits next to the binaries it is checked against the
//! dimensions and its quantization parameters are re-attached to the tensors.

use crate::artifact::Validated;
use crate::{artifact_path, ArtifactError, ArtifactManifest, ModelArtifactSet, ModelDims, TensorRole};
use std::path::PathBuf;
use tensor_core::{codec, QuantizedTensor};

/// Presence and size of one artifact file.
#[derive(Debug, Clone)]
pub struct ArtifactStatus {
    pub role: TensorRole,
    pub path: PathBuf,
    pub expected_bytes: usize,
    /// `None` when the file does not exist or cannot be stat'ed.
    pub actual_bytes: Option<usize>,
}

impl ArtifactStatus {
    pub fn is_present(&self) -> bool {
        self.actual_bytes.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.actual_bytes == Some(self.expected_bytes)
    }
}

/// Loads artifacts from `<prefix><suffix>` files.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    prefix: String,
    dims: ModelDims,
}

impl ArtifactLoader {
    pub fn new(prefix: impl Into<String>, dims: ModelDims) -> Self {
        Self {
            prefix: prefix.into(),
            dims,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Reports which artifact files exist and whether their sizes match.
    pub fn status(&self) -> Vec<ArtifactStatus> {
        TensorRole::ALL
            .into_iter()
            .map(|role| {
                let path = artifact_path(&self.prefix, role);
                let actual_bytes = std::fs::metadata(&path).ok().map(|m| m.len() as usize);
                ArtifactStatus {
                    role,
                    expected_bytes: role.size_bytes(&self.dims),
                    path,
                    actual_bytes,
                }
            })
            .collect()
    }

    /// Returns `true` if all four files exist.
    pub fn all_present(&self) -> bool {
        self.status().iter().all(ArtifactStatus::is_present)
    }

    /// Loads the manifest sidecar, if one exists.
    pub fn manifest(&self) -> Result<Option<ArtifactManifest>, ArtifactError> {
        let path = ArtifactManifest::path_for(&self.prefix);
        if !path.exists() {
            return Ok(None);
        }
        ArtifactManifest::from_file(&path).map(Some)
    }

    /// Reads and validates all four tensors.
    pub fn load(&self) -> Result<ModelArtifactSet<Validated>, ArtifactError> {
        self.dims.validate()?;
        let manifest = self.manifest()?;
        if let Some(m) = &manifest {
            m.check_against(&self.dims)?;
        }

        let read = |role: TensorRole| -> Result<QuantizedTensor, ArtifactError> {
            let mut tensor = self.load_tensor(role)?;
            if let Some(quant) = manifest
                .as_ref()
                .and_then(|m| m.tensor(role))
                .and_then(|t| t.quant.clone())
            {
                tensor = tensor.with_quant(quant)?;
            }
            Ok(tensor)
        };

        let set = ModelArtifactSet::new(
            self.dims,
            read(TensorRole::HiddenWeights)?,
            read(TensorRole::HiddenBias)?,
            read(TensorRole::OutputWeights)?,
            read(TensorRole::OutputBias)?,
        )
        .validate()?;

        tracing::info!("loaded {} from prefix '{}'", set.summary(), self.prefix);
        Ok(set)
    }

    /// Reads a single tensor, enforcing its exact byte length.
    pub fn load_tensor(&self, role: TensorRole) -> Result<QuantizedTensor, ArtifactError> {
        let path = artifact_path(&self.prefix, role);
        let bytes = std::fs::read(&path).map_err(|e| ArtifactError::Read {
            path: path.clone(),
            source: e,
        })?;

        let expected = role.size_bytes(&self.dims);
        if bytes.len() != expected {
            return Err(ArtifactError::SizeMismatch {
                path,
                expected,
                actual: bytes.len(),
            });
        }

        Ok(codec::decode(&bytes, role.shape(&self.dims), role.dtype())?)
    }
}
