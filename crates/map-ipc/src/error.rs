// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for map access and response decoding.

/// Errors that can occur when talking to a map store.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The map-store tool could not be started at all.
    #[error("failed to run `{tool}`: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The map-store tool exited with a non-zero status.
    #[error("`{command}` exited with {status}: {stderr}")]
    ExternalTool {
        command: String,
        status: String,
        stderr: String,
    },

    /// The lookup response was an empty list.
    #[error("no data returned from map lookup")]
    EmptyResult,

    /// The lookup response is not JSON or has no usable `"value"` field.
    #[error("unexpected lookup response: {0}")]
    MalformedResponse(String),

    /// The looked-up value is shorter than the map's minimum record size.
    #[error("map value has {actual} bytes, expected at least {expected_min}")]
    UndersizedValue { expected_min: usize, actual: usize },

    /// A value handed to `update` does not have the map's fixed size.
    #[error("value for map '{map}' has {actual} bytes, expected {expected}")]
    ValueSize {
        map: String,
        expected: usize,
        actual: usize,
    },

    /// The key is outside the map.
    #[error("key {key} not present in map '{map}'")]
    KeyNotFound { map: String, key: u32 },

    /// The value bytes could not be decoded into logits.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),
}
