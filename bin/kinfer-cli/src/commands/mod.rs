// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI helpers.

pub mod export;
pub mod infer;
pub mod inspect;
pub mod load_params;

use anyhow::Context;
use runtime::InferenceConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbosity maps to
/// `warn` / `info` / `debug` / `trace`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the configuration file if one was given, else the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<InferenceConfig> {
    match path {
        Some(p) => {
            let config = InferenceConfig::from_file(p)
                .with_context(|| format!("loading configuration from '{}'", p.display()))?;
            tracing::info!("loaded configuration from {}", p.display());
            Ok(config)
        }
        None => {
            tracing::debug!("no configuration file given; using defaults");
            Ok(InferenceConfig::default())
        }
    }
}

/// Prints the boxed banner that heads every command's output.
pub fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║{:^54}║", format!("kinfer · {title}"));
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}
