// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for triggering and trace verification.

/// Errors that can occur when triggering the surface or reading the trace.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The trace feed could not be opened (missing debugfs, no permission).
    #[error("trace feed {path} unavailable: {source}")]
    TraceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from an opened trace feed failed.
    #[error("failed reading trace feed {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The background reader could not be started.
    #[error("failed to start trace reader: {0}")]
    ReaderSpawn(#[source] std::io::Error),

    /// A trigger implementation failed to fire.
    #[error("execution trigger failed: {0}")]
    TriggerFailed(String),
}
