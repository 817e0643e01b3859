// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `kinfer export` command: write the four parameter artifacts.
//!
//! Reads the quantized model document produced by training, validates every
//! tensor against the document's dimensions, and writes headerless binaries
//! at `<prefix>` plus the fixed suffixes.

use anyhow::Context;
use model_artifacts::QuantizedModelDocument;
use std::path::PathBuf;

pub fn execute(model: PathBuf, prefix: String, write_manifest: bool) -> anyhow::Result<()> {
    super::banner("Parameter Export");

    let doc = QuantizedModelDocument::from_file(&model)
        .with_context(|| format!("reading model document '{}'", model.display()))?;
    let set = doc
        .into_validated()
        .context("model document does not describe a valid parameter set")?;

    println!("  Model:   {}", model.display());
    println!("  {}", set.summary());
    println!();

    let report = model_artifacts::ArtifactExporter::new(prefix.clone())
        .with_manifest(write_manifest)
        .export(&set)
        .with_context(|| format!("exporting to prefix '{prefix}'"))?;

    println!("  {:<16} {:>10}  {}", "Tensor", "Bytes", "File");
    println!("  {}", "-".repeat(60));
    for file in &report.files {
        println!(
            "  {:<16} {:>10}  {}",
            file.role.to_string(),
            file.size_bytes,
            file.path.display()
        );
    }
    if let Some(manifest) = &report.manifest {
        println!("  {:<16} {:>10}  {}", "manifest", "-", manifest.display());
    }
    println!();
    println!("  Wrote {} bytes of parameters.", report.total_bytes());

    Ok(())
}
