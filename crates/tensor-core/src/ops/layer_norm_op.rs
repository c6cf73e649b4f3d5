// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer normalization.

use rayon::prelude::*;

use super::{f32_input, f32_output};
use crate::{Tensor, TensorError, TensorView};

/// Applies layer normalization over the last dimension:
///
/// `output = gamma * (x - mean) / sqrt(var + eps) + beta`
///
/// # Arguments
/// * `input`  — any rank ≥ 1, normalised over the last dim.
/// * `gamma`  — scale, 1-D with length equal to the last dimension.
/// * `beta`   — shift, 1-D with length equal to the last dimension.
/// * `eps`    — variance floor.
/// * `output` — pre-shaped like `input`.
pub fn layer_norm(
    input: &TensorView<'_>,
    gamma: &TensorView<'_>,
    beta: &TensorView<'_>,
    eps: f32,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    f32_output("layer_norm", input.shape(), output)?;

    let last_dim = match input.shape().last_dim() {
        Some(d) if d > 0 => d,
        _ => {
            return Err(TensorError::ShapeMismatch {
                op: "layer_norm (input)",
                lhs: input.shape().clone(),
                rhs: gamma.shape().clone(),
            })
        }
    };
    for (name, param) in [("layer_norm (gamma)", gamma), ("layer_norm (beta)", beta)] {
        if param.shape().dims() != [last_dim] {
            return Err(TensorError::ShapeMismatch {
                op: name,
                lhs: param.shape().clone(),
                rhs: input.shape().clone(),
            });
        }
    }

    let mut data = f32_input("layer_norm", input)?;
    let g = f32_input("layer_norm", gamma)?;
    let b = f32_input("layer_norm", beta)?;
    let n = last_dim as f32;

    data.par_chunks_mut(last_dim).for_each(|row| {
        let mean = row.iter().sum::<f32>() / n;
        let var = row.iter().map(|&x| (x - mean) * (x - mean)).sum::<f32>() / n;
        let inv_std = 1.0 / (var + eps).sqrt();
        for ((x, &gj), &bj) in row.iter_mut().zip(&g).zip(&b) {
            *x = gj * (*x - mean) * inv_std + bj;
        }
    });

    output.typed_mut::<f32>()?.copy_from_slice(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DType, Shape};

    fn f32s(shape: Shape, values: &[f32]) -> Tensor {
        Tensor::from_values(shape, values).unwrap()
    }

    #[test]
    fn test_layer_norm_zero_mean_unit_variance() {
        let input = f32s(Shape::vector(5), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let gamma = f32s(Shape::vector(5), &[1.0; 5]);
        let beta = f32s(Shape::vector(5), &[0.0; 5]);
        let mut output = Tensor::zeros(Shape::vector(5), DType::Float32).unwrap();

        layer_norm(&input.view(), &gamma.view(), &beta.view(), 1e-5, &mut output).unwrap();

        let r = output.to_vec::<f32>().unwrap();
        let mean: f32 = r.iter().sum::<f32>() / 5.0;
        let var: f32 = r.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / 5.0;
        assert!(mean.abs() < 1e-5);
        assert!((var - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_layer_norm_constant_row_yields_beta() {
        let input = f32s(Shape::matrix(1, 3), &[5.0, 5.0, 5.0]);
        let gamma = f32s(Shape::vector(3), &[2.0; 3]);
        let beta = f32s(Shape::vector(3), &[1.0, 2.0, 3.0]);
        let mut output = Tensor::zeros(Shape::matrix(1, 3), DType::Float32).unwrap();

        layer_norm(&input.view(), &gamma.view(), &beta.view(), 1e-5, &mut output).unwrap();

        let r = output.to_vec::<f32>().unwrap();
        assert!(r.iter().zip([1.0, 2.0, 3.0]).all(|(a, b)| (a - b).abs() < 1e-2));
    }

    #[test]
    fn test_layer_norm_gamma_length_mismatch() {
        let input = f32s(Shape::vector(3), &[1.0, 2.0, 3.0]);
        let gamma = f32s(Shape::vector(4), &[1.0; 4]);
        let beta = f32s(Shape::vector(3), &[0.0; 3]);
        let mut output = Tensor::zeros(Shape::vector(3), DType::Float32).unwrap();

        assert!(layer_norm(&input.view(), &gamma.view(), &beta.view(), 1e-5, &mut output).is_err());
    }
}
