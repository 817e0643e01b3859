// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Uploading model parameters into the surface's weight maps.
//!
//! [`WeightLoader`] provides two modes:
//!
//! 1. **File-backed**: reads the four exported artifacts at a prefix. This
//!    is the production path.
//! 2. **Synthetic**: every weight is 1 and every bias is 1. Used when no
//!    artifacts exist so the surface has something to run against; its
//!    predictions are meaningless.
//!
//! A prefix with only some of its files present mixes the two per tensor.

use crate::RuntimeError;
use map_ipc::MapStore;
use model_artifacts::artifact::Validated;
use model_artifacts::{ArtifactLoader, ModelArtifactSet, ModelDims, TensorRole};
use tensor_core::QuantizedTensor;

const PLACEHOLDER_WEIGHT: i8 = 1;
const PLACEHOLDER_BIAS: i32 = 1;

/// Where the parameters came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightSource {
    Artifacts { prefix: String },
    /// Some files at `prefix` were missing; those tensors are placeholders.
    Partial {
        prefix: String,
        missing: Vec<TensorRole>,
    },
    /// Supplied directly by the caller, e.g. from a model document.
    Provided,
    Synthetic,
}

/// One parameter map written by [`WeightLoader::upload`].
#[derive(Debug, Clone)]
pub struct UploadedTensor {
    pub role: TensorRole,
    pub map: String,
    pub bytes: usize,
}

/// Holds a validated parameter set and pushes it into the weight maps.
pub struct WeightLoader {
    set: ModelArtifactSet<Validated>,
    source: WeightSource,
}

impl WeightLoader {
    /// Loads artifacts from `prefix`.
    ///
    /// Each missing file is replaced by placeholder values for that tensor
    /// alone, with a warning; the files that exist are still loaded. With
    /// all four missing the loader is fully synthetic. Files that exist but
    /// have the wrong size, or disagree with a manifest, are errors.
    pub fn from_prefix(prefix: &str, dims: ModelDims) -> Result<Self, RuntimeError> {
        let loader = ArtifactLoader::new(prefix, dims);
        let missing: Vec<TensorRole> = loader
            .status()
            .into_iter()
            .filter(|s| !s.is_present())
            .map(|s| {
                tracing::warn!(
                    "weight loader: '{}' not found, using placeholder {}",
                    s.path.display(),
                    s.role
                );
                s.role
            })
            .collect();

        if missing.is_empty() {
            let set = loader.load()?;
            tracing::info!("weight loader: {}", set.summary());
            return Ok(Self {
                set,
                source: WeightSource::Artifacts {
                    prefix: prefix.to_string(),
                },
            });
        }

        tracing::warn!(
            "weight loader: {} of {} tensors are placeholders; predictions will be meaningless",
            missing.len(),
            TensorRole::ALL.len()
        );
        if missing.len() == TensorRole::ALL.len() {
            return Self::synthetic(dims);
        }

        if let Some(manifest) = loader.manifest()? {
            manifest.check_against(&dims)?;
        }
        let placeholders = ModelArtifactSet::placeholder(dims, PLACEHOLDER_WEIGHT, PLACEHOLDER_BIAS)?;
        let tensor = |role: TensorRole| -> Result<QuantizedTensor, RuntimeError> {
            if missing.contains(&role) {
                Ok(placeholders.tensor(role).clone())
            } else {
                Ok(loader.load_tensor(role)?)
            }
        };
        let set = ModelArtifactSet::new(
            dims,
            tensor(TensorRole::HiddenWeights)?,
            tensor(TensorRole::HiddenBias)?,
            tensor(TensorRole::OutputWeights)?,
            tensor(TensorRole::OutputBias)?,
        )
        .validate()?;

        Ok(Self {
            set,
            source: WeightSource::Partial {
                prefix: prefix.to_string(),
                missing,
            },
        })
    }

    /// Creates a loader with placeholder parameters (weights 1, biases 1).
    pub fn synthetic(dims: ModelDims) -> Result<Self, RuntimeError> {
        let set = ModelArtifactSet::placeholder(dims, PLACEHOLDER_WEIGHT, PLACEHOLDER_BIAS)?;
        Ok(Self {
            set,
            source: WeightSource::Synthetic,
        })
    }

    /// Wraps an already validated set, e.g. one built from a model document.
    pub fn from_set(set: ModelArtifactSet<Validated>, source: WeightSource) -> Self {
        Self { set, source }
    }

    /// Returns `true` if every tensor was read from an artifact file.
    pub fn is_file_backed(&self) -> bool {
        matches!(self.source, WeightSource::Artifacts { .. })
    }

    pub fn source(&self) -> &WeightSource {
        &self.source
    }

    pub fn artifacts(&self) -> &ModelArtifactSet<Validated> {
        &self.set
    }

    /// Writes each tensor to its map at key 0, in export order.
    ///
    /// `store_for` maps a role to the store holding that tensor. The first
    /// failure aborts; maps written before it keep their new contents.
    pub fn upload<S, F>(&self, mut store_for: F) -> Result<Vec<UploadedTensor>, RuntimeError>
    where
        S: MapStore,
        F: FnMut(TensorRole) -> S,
    {
        let mut uploaded = Vec::with_capacity(TensorRole::ALL.len());
        for (role, tensor) in self.set.iter() {
            let store = store_for(role);
            store
                .update(map_ipc::SLOT_KEY, tensor.as_bytes())
                .map_err(|e| RuntimeError::WeightUpload { role, source: e })?;
            tracing::info!(
                "uploaded {role} ({} bytes) to {}",
                tensor.size_bytes(),
                store.describe()
            );
            uploaded.push(UploadedTensor {
                role,
                map: store.describe(),
                bytes: tensor.size_bytes(),
            });
        }
        Ok(uploaded)
    }
}

impl std::fmt::Debug for WeightLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightLoader")
            .field("source", &self.source)
            .field("dims", self.set.dims())
            .finish()
    }
}
