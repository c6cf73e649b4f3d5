// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Embedding-table lookup.

use super::{f32_input, f32_output};
use crate::{DType, Tensor, TensorError, TensorView};

/// Gathers rows of a `[V, D]` embedding table.
///
/// `ids` is any-rank `Int32` or `Int64`; `output` must be `ids.shape ++ [D]`.
///
/// # Errors
/// Returns [`TensorError::Numeric`] for an id outside `0..V`.
pub fn embedding_lookup(
    ids: &TensorView<'_>,
    table: &TensorView<'_>,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let t = table.shape().dims();
    if t.len() != 2 {
        return Err(TensorError::ShapeMismatch {
            op: "embedding_lookup",
            lhs: ids.shape().clone(),
            rhs: table.shape().clone(),
        });
    }
    let (vocab, width) = (t[0], t[1]);
    f32_output("embedding_lookup", &ids.shape().with_trailing(width), output)?;

    let indices: Vec<i64> = match ids.dtype() {
        DType::Int32 => ids.typed::<i32>()?.iter().map(i64::from).collect(),
        DType::Int64 => ids.to_vec::<i64>()?,
        dtype => {
            return Err(TensorError::UnsupportedDType {
                op: "embedding_lookup",
                dtype,
            })
        }
    };
    let rows = f32_input("embedding_lookup", table)?;

    let mut out = Vec::with_capacity(indices.len() * width);
    for id in indices {
        let row = usize::try_from(id)
            .ok()
            .filter(|&r| r < vocab)
            .ok_or_else(|| TensorError::Numeric {
                op: "embedding_lookup",
                detail: format!("id {id} outside vocabulary of {vocab}"),
            })?;
        out.extend_from_slice(&rows[row * width..(row + 1) * width]);
    }
    output.typed_mut::<f32>()?.copy_from_slice(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    fn table() -> Tensor {
        Tensor::from_values(Shape::matrix(3, 2), &[0.0f32, 0.1, 1.0, 1.1, 2.0, 2.1]).unwrap()
    }

    #[test]
    fn test_lookup_int64_ids() {
        let ids = Tensor::from_values(Shape::matrix(1, 3), &[2i64, 0, 2]).unwrap();
        let mut out = Tensor::zeros(Shape::new(vec![1, 3, 2]), DType::Float32).unwrap();
        embedding_lookup(&ids.view(), &table().view(), &mut out).unwrap();
        assert_eq!(
            out.to_vec::<f32>().unwrap(),
            vec![2.0, 2.1, 0.0, 0.1, 2.0, 2.1]
        );
    }

    #[test]
    fn test_lookup_rejects_out_of_range_id() {
        let ids = Tensor::from_values(Shape::vector(1), &[3i32]).unwrap();
        let mut out = Tensor::zeros(Shape::matrix(1, 2), DType::Float32).unwrap();
        assert!(matches!(
            embedding_lookup(&ids.view(), &table().view(), &mut out),
            Err(TensorError::Numeric { .. })
        ));
    }

    #[test]
    fn test_lookup_rejects_negative_id() {
        let ids = Tensor::from_values(Shape::vector(1), &[-1i64]).unwrap();
        let mut out = Tensor::zeros(Shape::matrix(1, 2), DType::Float32).unwrap();
        assert!(embedding_lookup(&ids.view(), &table().view(), &mut out).is_err());
    }
}
