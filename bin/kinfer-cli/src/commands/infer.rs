// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `kinfer infer` command: classify one image through the kernel maps.
//!
//! ```text
//! image → 28×28 gray → input map → getpid → trace check → settle → output map → argmax
//! ```

use anyhow::Context;
use runtime::{InferenceConfig, InferencePipeline, InputBuffer};
use std::path::PathBuf;

pub fn execute(
    mut config: InferenceConfig,
    image: PathBuf,
    no_trace: bool,
    verbose: u8,
) -> anyhow::Result<()> {
    banner_for(&image);

    if no_trace {
        config.verify_trace = false;
    }

    // ── Input ──────────────────────────────────────────────────
    // Decoded and size-checked before any map is touched.
    let input = InputBuffer::from_image_path(&image, &config.dims)
        .with_context(|| format!("preparing input from '{}'", image.display()))?;
    println!(
        "  Input:    {} samples, mean intensity {:.1}",
        input.len(),
        input.mean()
    );
    println!("  Maps:     {} → {}", config.input_map.display(), config.output_map.display());
    println!("  Settle:   {}", config.settle_policy());
    println!();

    // ── Request ────────────────────────────────────────────────
    let pipeline = InferencePipeline::from_config(&config);
    tracing::debug!("{pipeline:?}");
    let out = pipeline.run(&input)?;

    match out.trace_detected {
        Some(true) => println!("  Verification: BPF program executed in kernel space."),
        Some(false) => println!(
            "  Verification: no kernel trace marker observed (the program may still have run)."
        ),
        None => println!("  Verification: skipped."),
    }
    println!();
    println!("  Output (raw int32 values): {}", out.logits);
    println!("  Predicted digit: {}", out.label);

    if verbose > 0 {
        println!();
        println!("  {}", out.metrics.summary());
    }

    Ok(())
}

fn banner_for(image: &std::path::Path) {
    super::banner("Inference");
    println!("  Image:    {}", image.display());
}
