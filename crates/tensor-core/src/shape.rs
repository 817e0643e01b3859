// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use std::fmt;

/// Describes the dimensionality of a [`crate::QuantizedTensor`].
///
/// The exchange protocol only ever moves vectors (biases, input, logits) and
/// row-major matrices (weights), but the descriptor stays N-dimensional.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![32, 784]);
    /// assert_eq!(s.rank(), 2);
    /// assert_eq!(s.num_elements(), 25088);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape `(rows, cols)`.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1.
    pub fn num_elements(&self) -> usize {
        if self.dims.is_empty() {
            1
        } else {
            self.dims.iter().product()
        }
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Returns the leading dimension, which is the output-channel axis for
    /// weight matrices and the length for vectors.
    pub fn channels(&self) -> usize {
        self.dims.first().copied().unwrap_or(1)
    }

    /// Computes the encoded length in bytes for a given [`crate::DType`].
    pub fn size_bytes(&self, dtype: super::DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DType;

    #[test]
    fn test_vector_shape() {
        let s = Shape::vector(10);
        assert_eq!(s.rank(), 1);
        assert_eq!(s.num_elements(), 10);
        assert_eq!(s.channels(), 10);
    }

    #[test]
    fn test_matrix_shape() {
        let s = Shape::matrix(10, 32);
        assert_eq!(s.rank(), 2);
        assert_eq!(s.num_elements(), 320);
        assert_eq!(s.channels(), 10);
        assert_eq!(s.dim(1), Some(32));
        assert_eq!(s.dim(2), None);
    }

    #[test]
    fn test_scalar_elements() {
        let s = Shape::new(vec![]);
        assert_eq!(s.num_elements(), 1);
        assert_eq!(s.channels(), 1);
    }

    #[test]
    fn test_size_bytes() {
        let s = Shape::matrix(32, 784);
        assert_eq!(s.size_bytes(DType::I8), 32 * 784);
        assert_eq!(Shape::vector(32).size_bytes(DType::I32), 128);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Shape::matrix(32, 784)), "(32, 784)");
    }

    #[test]
    fn test_from_conversions() {
        let s1: Shape = vec![2, 3].into();
        let s2: Shape = (&[2, 3][..]).into();
        assert_eq!(s1, s2);
    }
}
