// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-artifacts
//!
//! The on-disk contract between the training stage and the execution
//! surface: four flat, headerless binary files holding the quantized
//! parameters of a two-layer perceptron.
//!
//! - [`ModelDims`]: input / hidden / output sizes (784 / 32 / 10 by default).
//! - [`TensorRole`]: which of the four parameter tensors a file holds.
//! - [`ModelArtifactSet`]: the four tensors, with a **type-state pattern**
//!   (`Unchecked` → `Validated`) so only shape-checked sets are exported.
//! - [`ArtifactExporter`]: writes a validated set to `<prefix><suffix>` files.
//! - [`ArtifactLoader`]: reads the files back, enforcing exact byte lengths.
//! - [`ArtifactManifest`]: optional JSON sidecar recording dims, shapes, and
//!   quantization parameters.
//! - [`QuantizedModelDocument`]: JSON interchange form of a quantized model.
//!
//! # File Layout
//! | role            | suffix            | dtype | shape            |
//! |-----------------|-------------------|-------|------------------|
//! | hidden weights  | `hweights8.bin`   | i8    | (hidden, input)  |
//! | hidden bias     | `hbias32.bin`     | i32   | (hidden)         |
//! | output weights  | `outweights8.bin` | i8    | (output, hidden) |
//! | output bias     | `outbias32.bin`   | i32   | (output)         |
//!
//! # Example
//! ```no_run
//! use model_artifacts::{ArtifactExporter, ArtifactLoader, ModelDims};
//!
//! let set = ArtifactLoader::new("build/mnist_", ModelDims::default()).load().unwrap();
//! ArtifactExporter::new("backup/mnist_").export(&set).unwrap();
//! ```

pub mod artifact;
mod dims;
mod document;
mod error;
mod exporter;
mod loader;
mod manifest;
mod role;

pub use artifact::ModelArtifactSet;
pub use dims::ModelDims;
pub use document::{QuantizedModelDocument, TensorDocument};
pub use error::ArtifactError;
pub use exporter::{artifact_path, ArtifactExporter, ExportReport, ExportedFile};
pub use loader::{ArtifactLoader, ArtifactStatus};
pub use manifest::{ArtifactManifest, ManifestTensor, MANIFEST_SUFFIX};
pub use role::TensorRole;
