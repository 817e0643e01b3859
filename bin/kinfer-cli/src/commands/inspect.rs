// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `kinfer inspect` command: verify artifacts and summarise their contents.
//!
//! Checks each of the four files for presence and exact size, cross-checks
//! the manifest sidecar when there is one, and prints integer and
//! dequantized value ranges.

use model_artifacts::ArtifactLoader;
use runtime::InferenceConfig;
use tensor_core::QuantizedTensor;

pub fn execute(config: InferenceConfig, prefix: String) -> anyhow::Result<()> {
    super::banner("Artifact Inspector");

    let loader = ArtifactLoader::new(prefix.clone(), config.dims);
    println!("  Prefix: {prefix}");
    println!("  Dims:   {}", config.dims);
    println!();

    // ── Files ──────────────────────────────────────────────────
    println!("  {:<16} {:>10} {:>10}  {:<8} {}", "Tensor", "Expected", "Actual", "Status", "Path");
    println!("  {}", "-".repeat(78));
    let statuses = loader.status();
    for s in &statuses {
        let actual = s
            .actual_bytes
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".into());
        let state = if s.is_valid() {
            "ok"
        } else if s.is_present() {
            "SIZE"
        } else {
            "MISSING"
        };
        println!(
            "  {:<16} {:>10} {:>10}  {:<8} {}",
            s.role.to_string(),
            s.expected_bytes,
            actual,
            state,
            s.path.display()
        );
    }
    println!();

    let bad = statuses.iter().filter(|s| !s.is_valid()).count();
    if bad > 0 {
        anyhow::bail!("{bad} of 4 artifacts missing or the wrong size");
    }

    // ── Manifest ───────────────────────────────────────────────
    match loader.manifest()? {
        Some(m) => {
            m.check_against(&config.dims)?;
            println!("  Manifest: format v{}, dims {} (matches)", m.format_version, m.dims);
        }
        None => println!("  Manifest: none (quantization parameters unknown)"),
    }
    println!();

    // ── Contents ───────────────────────────────────────────────
    let set = loader.load()?;
    println!(
        "  {:<16} {:>12} {:>12}  {}",
        "Tensor", "Min", "Max", "Dequantized range"
    );
    println!("  {}", "-".repeat(70));
    for (role, tensor) in set.iter() {
        let (lo, hi) = int_range(tensor);
        println!(
            "  {:<16} {:>12} {:>12}  {}",
            role.to_string(),
            lo,
            hi,
            dequantized_range(tensor)
        );
    }
    println!();
    println!("  {}", set.summary());

    Ok(())
}

fn int_range(tensor: &QuantizedTensor) -> (i32, i32) {
    let values = tensor.to_widened();
    let lo = values.iter().copied().min().unwrap_or(0);
    let hi = values.iter().copied().max().unwrap_or(0);
    (lo, hi)
}

/// Real-valued range, dequantizing each element with its channel's scale.
fn dequantized_range(tensor: &QuantizedTensor) -> String {
    let Some(quant) = tensor.quant() else {
        return "-".into();
    };
    let channels = tensor.shape().channels().max(1);
    let per_channel = (tensor.num_elements() / channels).max(1);
    let values = tensor.to_widened();

    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for (i, &q) in values.iter().enumerate() {
        if let Some(r) = quant.dequantize(i / per_channel, q) {
            lo = lo.min(r);
            hi = hi.max(r);
        }
    }
    if lo > hi {
        return "-".into();
    }
    format!("[{lo:.4}, {hi:.4}]")
}
