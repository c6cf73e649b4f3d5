// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use std::fmt;

/// Describes the dimensionality of a tensor slot.
///
/// Shapes are immutable once created. The harness reads the batch and
/// sequence-length dimensions through [`Shape::dim`], kernels use
/// [`Shape::strides`] and [`Shape::broadcast`] for indexing.
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
    /// let s = Shape::new(vec![1, 8]);
    /// assert_eq!(s.rank(), 2);
    /// assert_eq!(s.num_elements(), 8);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape (matrix).
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
    /// For a scalar shape (rank 0), returns 1. Saturates at `usize::MAX`;
    /// shapes read from a model file are checked with
    /// [`Shape::checked_num_elements`] before anything is sized from them.
    pub fn num_elements(&self) -> usize {
        self.checked_num_elements().unwrap_or(usize::MAX)
    }

    /// Returns the total number of elements, or `None` if the product of the
    /// dimensions overflows `usize`.
    pub fn checked_num_elements(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Returns the innermost dimension, or `None` for a scalar.
    pub fn last_dim(&self) -> Option<usize> {
        self.dims.last().copied()
    }

    /// Returns a copy of this shape with `dim` appended as a new innermost axis.
    pub fn with_trailing(&self, dim: usize) -> Shape {
        let mut dims = self.dims.clone();
        dims.push(dim);
        Shape { dims }
    }

    /// Returns a copy of this shape with the innermost axis replaced by `dim`.
    ///
    /// A scalar shape becomes the vector `[dim]`.
    pub fn with_last(&self, dim: usize) -> Shape {
        let mut dims = self.dims.clone();
        match dims.last_mut() {
            Some(last) => *last = dim,
            None => dims.push(dim),
        }
        Shape { dims }
    }

    /// Computes row-major (C-order) strides for this shape.
    ///
    /// The stride for dimension `i` is the number of elements to skip
    /// in the flat buffer to advance one step along that dimension.
    pub fn strides(&self) -> Vec<usize> {
        let rank = self.dims.len();
        if rank == 0 {
            return vec![];
        }
        let mut strides = vec![0usize; rank];
        strides[rank - 1] = 1;
        for i in (0..rank - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Returns the numpy-style broadcast of two shapes, or `None` if they
    /// are incompatible.
    ///
    /// Dimensions are aligned from the right; each pair must be equal or
    /// contain a 1.
    pub fn broadcast(&self, other: &Shape) -> Option<Shape> {
        let rank = self.rank().max(other.rank());
        let mut dims = vec![0usize; rank];
        for (i, out) in dims.iter_mut().enumerate() {
            let a = dim_from_right(&self.dims, rank - 1 - i);
            let b = dim_from_right(&other.dims, rank - 1 - i);
            *out = match (a, b) {
                (x, y) if x == y => x,
                (1, y) => y,
                (x, 1) => x,
                _ => return None,
            };
        }
        Some(Shape { dims })
    }
}

/// Dimension `offset` places from the innermost axis; missing leading axes are 1.
fn dim_from_right(dims: &[usize], offset: usize) -> usize {
    if offset < dims.len() {
        dims[dims.len() - 1 - offset]
    } else {
        1
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
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

    #[test]
    fn test_scalar_shape() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), 1);
        assert!(s.strides().is_empty());
        assert_eq!(s.last_dim(), None);
    }

    #[test]
    fn test_sequence_shape() {
        let s = Shape::matrix(1, 128);
        assert_eq!(s.dim(0), Some(1));
        assert_eq!(s.dim(1), Some(128));
        assert_eq!(s.dim(2), None);
        assert_eq!(s.num_elements(), 128);
    }

    #[test]
    fn test_zero_dim_has_no_elements() {
        assert_eq!(Shape::new(vec![1, 0]).num_elements(), 0);
    }

    #[test]
    fn test_element_count_overflow() {
        let huge = Shape::matrix(usize::MAX / 2, 3);
        assert_eq!(huge.checked_num_elements(), None);
        assert_eq!(huge.num_elements(), usize::MAX);
        assert_eq!(Shape::new(vec![2, 3, 4]).checked_num_elements(), Some(24));
    }

    #[test]
    fn test_3d_strides() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.strides(), vec![12, 4, 1]);
    }

    #[test]
    fn test_broadcast() {
        let a = Shape::new(vec![1, 8, 4]);
        let b = Shape::vector(4);
        assert_eq!(a.broadcast(&b), Some(Shape::new(vec![1, 8, 4])));

        let c = Shape::new(vec![8, 1]);
        assert_eq!(a.broadcast(&c), Some(Shape::new(vec![1, 8, 4])));

        let d = Shape::new(vec![3]);
        assert_eq!(a.broadcast(&d), None);
    }

    #[test]
    fn test_with_trailing_and_last() {
        let ids = Shape::matrix(1, 8);
        assert_eq!(ids.with_trailing(16), Shape::new(vec![1, 8, 16]));
        assert_eq!(ids.with_last(2), Shape::matrix(1, 2));
        assert_eq!(Shape::scalar().with_last(3), Shape::vector(3));
    }

    #[test]
    fn test_display() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(format!("{s}"), "[2, 3, 4]");
    }

    #[test]
    fn test_serde_is_plain_list() {
        let s: Shape = serde_json::from_str("[1, 8]").unwrap();
        assert_eq!(s, Shape::matrix(1, 8));
    }
}
