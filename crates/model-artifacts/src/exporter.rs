// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Writes a validated artifact set to flat binary files.
//!
//! Each tensor goes to `<prefix><suffix>` through the tensor codec, in
//! row-major order with no header. The prefix is concatenated verbatim, so
//! `"out/"` writes into a directory and `"mnist_"` prepends a file stem.
//!
//! Files are written one after another. If a write fails, files already
//! written stay in place; export is a one-shot offline step and is simply
//! re-run.

use crate::artifact::Validated;
use crate::{ArtifactError, ArtifactManifest, ModelArtifactSet, TensorRole};
use std::path::PathBuf;
use tensor_core::codec;

/// Builds the path of a role's artifact under a prefix.
pub fn artifact_path(prefix: &str, role: TensorRole) -> PathBuf {
    PathBuf::from(format!("{prefix}{}", role.file_suffix()))
}

/// One file written by an export.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub role: TensorRole,
    pub path: PathBuf,
    pub size_bytes: usize,
}

/// Files produced by [`ArtifactExporter::export`].
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub files: Vec<ExportedFile>,
    /// Path of the manifest sidecar, if one was written.
    pub manifest: Option<PathBuf>,
}

impl ExportReport {
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}

/// Writes artifact sets under a fixed path prefix.
#[derive(Debug, Clone)]
pub struct ArtifactExporter {
    prefix: String,
    write_manifest: bool,
}

impl ArtifactExporter {
    /// Creates an exporter that writes only the four binary files.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            write_manifest: false,
        }
    }

    /// Also writes `<prefix>manifest.json` after the binaries.
    pub fn with_manifest(mut self, enabled: bool) -> Self {
        self.write_manifest = enabled;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Writes the four tensors, creating or overwriting their files.
    pub fn export(&self, set: &ModelArtifactSet<Validated>) -> Result<ExportReport, ArtifactError> {
        self.ensure_parent_dir()?;

        let mut report = ExportReport::default();
        for (role, tensor) in set.iter() {
            let path = artifact_path(&self.prefix, role);
            let bytes = codec::encode(tensor);
            std::fs::write(&path, &bytes).map_err(|e| ArtifactError::Write {
                path: path.clone(),
                source: e,
            })?;
            tracing::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
            report.files.push(ExportedFile {
                role,
                path,
                size_bytes: bytes.len(),
            });
        }

        if self.write_manifest {
            let manifest = ArtifactManifest::from_set(set);
            let path = manifest.write(&self.prefix)?;
            report.manifest = Some(path);
        }

        tracing::info!(
            "exported {} artifacts ({} bytes) under prefix '{}'",
            report.files.len(),
            report.total_bytes(),
            self.prefix,
        );
        Ok(report)
    }

    /// Creates the directory part of the prefix, if any.
    fn ensure_parent_dir(&self) -> Result<(), ArtifactError> {
        let probe = artifact_path(&self.prefix, TensorRole::HiddenWeights);
        if let Some(parent) = probe.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ArtifactError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelDims;

    fn temp_prefix(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!("kinfer_export_{}_{name}", std::process::id()));
        format!("{}/", dir.display())
    }

    #[test]
    fn test_artifact_path_concatenates() {
        assert_eq!(
            artifact_path("build/mnist_", TensorRole::OutputBias),
            PathBuf::from("build/mnist_outbias32.bin")
        );
        assert_eq!(
            artifact_path("", TensorRole::HiddenWeights),
            PathBuf::from("hweights8.bin")
        );
    }

    #[test]
    fn test_export_reference_sizes() {
        let prefix = temp_prefix("sizes");
        let set = ModelArtifactSet::placeholder(ModelDims::default(), 1, 1).unwrap();
        let report = ArtifactExporter::new(&prefix).export(&set).unwrap();

        let expected = [
            (TensorRole::HiddenWeights, 32 * 784),
            (TensorRole::HiddenBias, 32 * 4),
            (TensorRole::OutputWeights, 10 * 32),
            (TensorRole::OutputBias, 10 * 4),
        ];
        for (role, len) in expected {
            let meta = std::fs::metadata(artifact_path(&prefix, role)).unwrap();
            assert_eq!(meta.len() as usize, len, "{role}");
        }
        assert_eq!(report.files.len(), 4);
        assert!(report.manifest.is_none());
        let _ = std::fs::remove_dir_all(prefix);
    }

    #[test]
    fn test_export_bias_is_little_endian() {
        let prefix = temp_prefix("le");
        let set = ModelArtifactSet::placeholder(ModelDims::new(2, 2, 1), -1, 258).unwrap();
        ArtifactExporter::new(&prefix).export(&set).unwrap();

        let bias = std::fs::read(artifact_path(&prefix, TensorRole::OutputBias)).unwrap();
        assert_eq!(bias, vec![2, 1, 0, 0]);
        let w = std::fs::read(artifact_path(&prefix, TensorRole::HiddenWeights)).unwrap();
        assert_eq!(w, vec![0xff; 4]);
        let _ = std::fs::remove_dir_all(prefix);
    }

    #[test]
    fn test_export_with_manifest() {
        let prefix = temp_prefix("manifest");
        let set = ModelArtifactSet::placeholder(ModelDims::default(), 0, 0).unwrap();
        let report = ArtifactExporter::new(&prefix)
            .with_manifest(true)
            .export(&set)
            .unwrap();
        let path = report.manifest.unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(prefix);
    }

    #[test]
    fn test_export_into_unwritable_prefix_fails() {
        let set = ModelArtifactSet::placeholder(ModelDims::new(2, 2, 1), 0, 0).unwrap();
        let err = ArtifactExporter::new("/proc/kinfer-no-such-dir/")
            .export(&set)
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Write { .. }));
    }
}
