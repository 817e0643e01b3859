// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Hex wire encoding for map-store command lines.
//!
//! Keys are 4-byte little-endian `u32`s rendered as lowercase hex, so key 0
//! is `"00000000"` and key 1 is `"01000000"`. Values are hex-encoded byte for
//! byte with nothing dropped or compressed.

/// Encodes a map key as lowercase hex of its little-endian bytes.
pub fn encode_key(key: u32) -> String {
    hex::encode(key.to_le_bytes())
}

/// Encodes a map value as lowercase hex.
pub fn encode_value(data: &[u8]) -> String {
    hex::encode(data)
}
