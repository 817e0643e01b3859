// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `kinfer load-params` command: push parameters into the weight maps.
//!
//! Parameters come either from exported artifacts at a prefix or straight
//! from a quantized model document. A missing artifact is replaced by
//! placeholder values (all ones) for that tensor only, so the kernel program
//! always has populated maps to run against.

use anyhow::Context;
use model_artifacts::{QuantizedModelDocument, TensorRole};
use runtime::{InferenceConfig, WeightLoader, WeightSource};
use std::path::PathBuf;

pub fn execute(
    config: InferenceConfig,
    prefix: Option<String>,
    model: Option<PathBuf>,
) -> anyhow::Result<()> {
    super::banner("Parameter Loader");

    let loader = match (model, prefix) {
        (Some(model), _) => {
            let set = QuantizedModelDocument::from_file(&model)
                .with_context(|| format!("reading model document '{}'", model.display()))?
                .into_validated()
                .context("model document does not describe a valid parameter set")?;
            anyhow::ensure!(
                set.dims() == &config.dims,
                "model document has dimensions {}, configuration expects {}",
                set.dims(),
                config.dims
            );
            println!("  Model:   {}", model.display());
            WeightLoader::from_set(set, WeightSource::Provided)
        }
        (None, Some(prefix)) => WeightLoader::from_prefix(&prefix, config.dims)?,
        (None, None) => anyhow::bail!("either --prefix or --model is required"),
    };

    match loader.source() {
        WeightSource::Artifacts { prefix } => println!("  Source:  artifacts at '{prefix}'"),
        WeightSource::Partial { prefix, missing } => {
            let names: Vec<String> = missing.iter().map(TensorRole::to_string).collect();
            println!("  Source:  artifacts at '{prefix}', placeholders for {}", names.join(", "));
            println!("           Predictions will be meaningless until real weights are loaded.");
        }
        WeightSource::Synthetic => {
            println!("  Source:  synthetic placeholders (artifacts missing)");
            println!("           Predictions will be meaningless until real weights are loaded.");
        }
        WeightSource::Provided => println!("  Source:  model document"),
    }
    println!("  {}", loader.artifacts().summary());
    println!();

    let uploaded = loader.upload(|role| config.weight_store(role))?;

    println!("  {:<16} {:>10}  {}", "Tensor", "Bytes", "Map");
    println!("  {}", "-".repeat(60));
    for u in &uploaded {
        println!("  {:<16} {:>10}  {}", u.role.to_string(), u.bytes, u.map);
    }
    println!();
    println!("  Model parameters loaded into {} maps.", uploaded.len());

    Ok(())
}
