// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # kinfer
//!
//! Command-line interface for quantized MNIST inference inside the kernel.
//!
//! ## Usage
//! ```bash
//! # Write the four parameter artifacts from a quantized model document
//! kinfer export --model ./model.json --prefix ./out/mnist_
//!
//! # Push the artifacts into the pinned weight maps
//! kinfer load-params --prefix ./out/mnist_
//!
//! # Or push a model document without exporting it first
//! kinfer load-params --model ./model.json
//!
//! # Classify an image
//! kinfer infer digit.png
//!
//! # Check artifacts against the expected sizes and manifest
//! kinfer inspect --prefix ./out/mnist_
//! ```
//!
//! Every failure, including a usage error, exits with status 1.

mod commands;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "kinfer",
    about = "Quantized MNIST inference through a kernel-resident eBPF program",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (map paths, dimensions, timeouts).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one image through the kernel maps.
    Infer {
        /// Image file to classify (any format the decoder understands).
        image: PathBuf,

        /// Skip scanning the kernel trace feed.
        #[arg(long)]
        no_trace: bool,
    },

    /// Write the four parameter artifacts from a quantized model document.
    Export {
        /// Quantized model document (JSON).
        #[arg(short, long)]
        model: PathBuf,

        /// Output prefix; files are named `<prefix>hweights8.bin` and so on.
        #[arg(short, long)]
        prefix: String,

        /// Do not write `<prefix>manifest.json`.
        #[arg(long)]
        no_manifest: bool,
    },

    /// Upload parameters into the pinned weight maps.
    LoadParams {
        /// Artifact prefix used at export time.
        #[arg(short, long, required_unless_present = "model", conflicts_with = "model")]
        prefix: Option<String>,

        /// Upload straight from a quantized model document instead.
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Check artifact files at a prefix and print their contents' ranges.
    Inspect {
        /// Artifact prefix used at export time.
        #[arg(short, long)]
        prefix: String,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Infer { image, no_trace } => {
            commands::infer::execute(config, image, no_trace, cli.verbose)
        }
        Commands::Export {
            model,
            prefix,
            no_manifest,
        } => commands::export::execute(model, prefix, !no_manifest),
        Commands::LoadParams { prefix, model } => {
            commands::load_params::execute(config, prefix, model)
        }
        Commands::Inspect { prefix } => commands::inspect::execute(config, prefix),
    }
}
