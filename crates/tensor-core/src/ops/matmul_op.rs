// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Matrix multiplication and fully-connected layers.

use rayon::prelude::*;

use super::{f32_input, f32_output};
use crate::{Shape, Tensor, TensorError, TensorView};

/// Performs matrix multiplication: `output = lhs @ rhs`.
///
/// `lhs` is `[M, K]`, `rhs` is `[K, N]`, and `output` must be `[M, N]`.
/// Rows of the output are computed in parallel.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if dimensions are incompatible.
/// Returns [`TensorError::UnsupportedDType`] if any tensor is not `Float32`.
pub fn matmul(
    lhs: &TensorView<'_>,
    rhs: &TensorView<'_>,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let (l, r) = (lhs.shape().dims(), rhs.shape().dims());
    if l.len() != 2 || r.len() != 2 || l[1] != r[0] {
        return Err(TensorError::ShapeMismatch {
            op: "matmul",
            lhs: lhs.shape().clone(),
            rhs: rhs.shape().clone(),
        });
    }
    let (m, k, n) = (l[0], l[1], r[1]);
    f32_output("matmul", &Shape::matrix(m, n), output)?;

    let a = f32_input("matmul", lhs)?;
    let b = f32_input("matmul", rhs)?;
    let mut c = vec![0.0f32; m * n];
    if n > 0 {
        // ikj order keeps the inner loop a saxpy over contiguous rows of B and C.
        c.par_chunks_mut(n).enumerate().for_each(|(i, c_row)| {
            for p in 0..k {
                let a_ip = a[i * k + p];
                let b_row = &b[p * n..(p + 1) * n];
                for (c_j, &b_j) in c_row.iter_mut().zip(b_row) {
                    *c_j += a_ip * b_j;
                }
            }
        });
    }
    output.typed_mut::<f32>()?.copy_from_slice(&c)
}

/// Applies a dense layer over the innermost axis:
/// `output[.., j] = sum_p input[.., p] * weights[j, p] + bias[j]`.
///
/// `weights` is laid out `[N, K]` (one row per output feature). `input` is
/// `[.., K]`; every leading axis is treated as a batch of rows and `output`
/// must be `[.., N]`. `bias`, when present, must be `[N]`.
pub fn fully_connected(
    input: &TensorView<'_>,
    weights: &TensorView<'_>,
    bias: Option<&TensorView<'_>>,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let w = weights.shape().dims();
    let k = input.shape().last_dim().unwrap_or(1);
    if w.len() != 2 || w[1] != k {
        return Err(TensorError::ShapeMismatch {
            op: "fully_connected",
            lhs: input.shape().clone(),
            rhs: weights.shape().clone(),
        });
    }
    let n = w[0];
    if let Some(b) = bias {
        if b.shape().dims() != [n] {
            return Err(TensorError::ShapeMismatch {
                op: "fully_connected (bias)",
                lhs: Shape::vector(n),
                rhs: b.shape().clone(),
            });
        }
    }
    f32_output("fully_connected", &input.shape().with_last(n), output)?;

    let x = f32_input("fully_connected", input)?;
    let wt = f32_input("fully_connected", weights)?;
    let bias = match bias {
        Some(b) => f32_input("fully_connected", b)?,
        None => vec![0.0; n],
    };

    let rows = if k == 0 { 0 } else { x.len() / k };
    let mut y = vec![0.0f32; rows * n];
    if n > 0 {
        y.par_chunks_mut(n).enumerate().for_each(|(i, y_row)| {
            let x_row = &x[i * k..(i + 1) * k];
            for (j, y_j) in y_row.iter_mut().enumerate() {
                let w_row = &wt[j * k..(j + 1) * k];
                let dot: f32 = x_row.iter().zip(w_row).map(|(a, b)| a * b).sum();
                *y_j = dot + bias[j];
            }
        });
    }
    output.typed_mut::<f32>()?.copy_from_slice(&y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DType;

    #[test]
    fn test_matmul_2x3_3x2() {
        let a = Tensor::from_values(Shape::matrix(2, 3), &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = Tensor::from_values(Shape::matrix(3, 2), &[7.0f32, 8.0, 9.0, 10.0, 11.0, 12.0]).unwrap();
        let mut c = Tensor::zeros(Shape::matrix(2, 2), DType::Float32).unwrap();

        matmul(&a.view(), &b.view(), &mut c).unwrap();
        assert_eq!(c.to_vec::<f32>().unwrap(), vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_matmul_shape_mismatch() {
        let a = Tensor::zeros(Shape::matrix(2, 3), DType::Float32).unwrap();
        let b = Tensor::zeros(Shape::matrix(2, 2), DType::Float32).unwrap();
        let mut c = Tensor::zeros(Shape::matrix(2, 2), DType::Float32).unwrap();
        assert!(matches!(
            matmul(&a.view(), &b.view(), &mut c),
            Err(TensorError::ShapeMismatch { op: "matmul", .. })
        ));
    }

    #[test]
    fn test_matmul_rejects_integer_inputs() {
        let a = Tensor::zeros(Shape::matrix(1, 1), DType::Int32).unwrap();
        let b = Tensor::zeros(Shape::matrix(1, 1), DType::Int32).unwrap();
        let mut c = Tensor::zeros(Shape::matrix(1, 1), DType::Float32).unwrap();
        assert!(matches!(
            matmul(&a.view(), &b.view(), &mut c),
            Err(TensorError::UnsupportedDType { .. })
        ));
    }

    #[test]
    fn test_fully_connected_batched_with_bias() {
        // Two rows of K=2 features, N=3 outputs.
        let x = Tensor::from_values(Shape::new(vec![1, 2, 2]), &[1.0f32, 2.0, 3.0, 4.0]).unwrap();
        let w = Tensor::from_values(
            Shape::matrix(3, 2),
            &[1.0f32, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
        .unwrap();
        let b = Tensor::from_values(Shape::vector(3), &[0.5f32, -0.5, 0.0]).unwrap();
        let mut y = Tensor::zeros(Shape::new(vec![1, 2, 3]), DType::Float32).unwrap();

        fully_connected(&x.view(), &w.view(), Some(&b.view()), &mut y).unwrap();
        assert_eq!(
            y.to_vec::<f32>().unwrap(),
            vec![1.5, 1.5, 3.0, 3.5, 3.5, 7.0]
        );
    }

    #[test]
    fn test_fully_connected_rejects_bad_bias() {
        let x = Tensor::zeros(Shape::matrix(1, 2), DType::Float32).unwrap();
        let w = Tensor::zeros(Shape::matrix(3, 2), DType::Float32).unwrap();
        let b = Tensor::zeros(Shape::vector(2), DType::Float32).unwrap();
        let mut y = Tensor::zeros(Shape::matrix(1, 3), DType::Float32).unwrap();
        assert!(fully_connected(&x.view(), &w.view(), Some(&b.view()), &mut y).is_err());
    }
}
