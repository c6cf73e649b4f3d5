// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax activation.

use rayon::prelude::*;

use super::{f32_input, f32_output};
use crate::{Tensor, TensorError, TensorView};

/// Computes softmax along the last dimension, subtracting the row maximum
/// before exponentiation. Rows are processed in parallel.
///
/// A scalar input yields `1.0`.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if input and output shapes differ.
/// Returns [`TensorError::UnsupportedDType`] if either side is not `Float32`.
pub fn softmax(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    f32_output("softmax", input.shape(), output)?;
    let mut data = f32_input("softmax", input)?;

    let Some(last_dim) = input.shape().last_dim() else {
        return output.typed_mut::<f32>()?.copy_from_slice(&[1.0]);
    };
    if last_dim == 0 {
        return Ok(());
    }

    data.par_chunks_mut(last_dim).for_each(|row| {
        let max_val = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0f32;
        for x in row.iter_mut() {
            *x = (*x - max_val).exp();
            sum += *x;
        }
        if sum > 0.0 {
            let inv_sum = 1.0 / sum;
            row.iter_mut().for_each(|x| *x *= inv_sum);
        }
    });

    output.typed_mut::<f32>()?.copy_from_slice(&data)
}
