// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element data types.

/// Enumerates the fixed-width integer types a [`crate::QuantizedTensor`] can hold.
///
/// The execution surface only understands three element types: raw `u8`
/// pixels on the input path, `i8` quantized weights, and `i32` biases and
/// logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 8-bit unsigned integer (raw input samples).
    U8,
    /// 8-bit signed integer (quantized weights).
    I8,
    /// 32-bit signed integer, little-endian (biases and output logits).
    I32,
}

impl DType {
    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::U8 | DType::I8 => 1,
            DType::I32 => 4,
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::U8 => "u8",
            DType::I8 => "i8",
            DType::I32 => "i32",
        }
    }

    /// Parses a dtype label, accepting the long `intN` spellings too.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "u8" | "uint8" => Some(DType::U8),
            "i8" | "int8" | "qint8" => Some(DType::I8),
            "i32" | "int32" | "qint32" => Some(DType::I32),
            _ => None,
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(DType::U8.size_bytes(), 1);
        assert_eq!(DType::I8.size_bytes(), 1);
        assert_eq!(DType::I32.size_bytes(), 4);
    }

    #[test]
    fn test_from_str_loose() {
        assert_eq!(DType::from_str_loose("INT8"), Some(DType::I8));
        assert_eq!(DType::from_str_loose("qint32"), Some(DType::I32));
        assert_eq!(DType::from_str_loose("f32"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DType::I32.to_string(), "i32");
        assert_eq!(format!("{}", DType::U8), "u8");
    }
}
