// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Decoding of map lookup responses into class logits.
//!
//! `bpftool -j map lookup` prints either a single object or a one-element
//! array holding that object. The stored record is the object's `"value"`
//! field, a list of bytes:
//!
//! ```json
//! [{"key": [0, 0, 0, 0], "value": [12, 0, 0, 0, 255, 255, 255, 255, ...]}]
//! ```
//!
//! Bytes may be JSON integers (0–255) or `"0x.."` hex strings, the two forms
//! `bpftool` emits depending on whether the map has BTF. The output map's
//! record is `classes × 4` bytes of little-endian `i32`.

use crate::MapError;
use serde_json::Value;
use std::fmt;
use tensor_core::codec;

/// Extracts the raw record bytes from a JSON lookup response.
///
/// # Errors
/// - [`MapError::EmptyResult`] if the response is an empty array.
/// - [`MapError::MalformedResponse`] if it is not JSON, has no `"value"`
///   field, or the value is not a list of bytes.
pub fn parse_lookup_response(raw: &[u8]) -> Result<Vec<u8>, MapError> {
    let json: Value = serde_json::from_slice(raw)
        .map_err(|e| MapError::MalformedResponse(format!("not valid JSON: {e}")))?;

    let record = match json {
        Value::Array(items) => items.into_iter().next().ok_or(MapError::EmptyResult)?,
        other => other,
    };

    let value = record
        .get("value")
        .ok_or_else(|| MapError::MalformedResponse("no \"value\" field".into()))?;

    let items = value
        .as_array()
        .ok_or_else(|| MapError::MalformedResponse("\"value\" is not a list".into()))?;

    items.iter().enumerate().map(|(i, v)| json_byte(i, v)).collect()
}

fn json_byte(index: usize, v: &Value) -> Result<u8, MapError> {
    let parsed = match v {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s
            .strip_prefix("0x")
            .and_then(|h| u8::from_str_radix(h, 16).ok()),
        _ => None,
    };
    parsed.ok_or_else(|| {
        MapError::MalformedResponse(format!("value[{index}] = {v} is not a byte"))
    })
}

/// Decodes a JSON lookup response from the output map into logits.
pub fn decode_output(raw: &[u8], classes: usize) -> Result<OutputVector, MapError> {
    let bytes = parse_lookup_response(raw)?;
    OutputVector::from_value_bytes(&bytes, classes)
}

/// Returns the index of the first maximum element, or `None` if empty.
///
/// # Examples
/// ```
/// assert_eq!(map_ipc::argmax(&[5, 5, 0]), Some(0));
/// assert_eq!(map_ipc::argmax(&[]), None);
/// ```
pub fn argmax(values: &[i32]) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, max)) if v <= max => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Class logits read back from the output map.
///
/// Never empty: construction fails for a zero class count, so
/// [`OutputVector::argmax`] always has an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputVector {
    logits: Vec<i32>,
}

impl OutputVector {
    /// Decodes the first `classes × 4` bytes of a record as little-endian
    /// `i32` logits. Trailing bytes beyond that are ignored.
    ///
    /// Fails with [`MapError::UndersizedValue`] if the record is shorter.
    pub fn from_value_bytes(bytes: &[u8], classes: usize) -> Result<Self, MapError> {
        if classes == 0 {
            return Err(MapError::MalformedResponse(
                "output dimension must be non-zero".into(),
            ));
        }
        let needed = classes * 4;
        if bytes.len() < needed {
            return Err(MapError::UndersizedValue {
                expected_min: needed,
                actual: bytes.len(),
            });
        }
        let logits = codec::decode_i32_le(&bytes[..needed])?;
        Ok(Self { logits })
    }

    /// Wraps logits that are already decoded. Returns `None` if empty.
    pub fn from_logits(logits: Vec<i32>) -> Option<Self> {
        if logits.is_empty() {
            None
        } else {
            Some(Self { logits })
        }
    }

    pub fn logits(&self) -> &[i32] {
        &self.logits
    }

    pub fn len(&self) -> usize {
        self.logits.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.logits.is_empty()
    }

    /// Index of the highest logit, ties broken toward the lowest index.
    pub fn argmax(&self) -> usize {
        argmax(&self.logits).unwrap_or(0)
    }

    /// The highest logit.
    pub fn max_logit(&self) -> i32 {
        self.logits[self.argmax()]
    }
}

impl fmt::Display for OutputVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.logits.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}
