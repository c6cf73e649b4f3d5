// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reference kernels executed by the built-in interpreter.
//!
//! Every kernel reads borrowed [`TensorView`](crate::TensorView)s and writes
//! into a pre-shaped output [`Tensor`](crate::Tensor); the caller decides the
//! output shape and element type, the kernel checks that they agree with the
//! inputs. Row-wise kernels split work with `rayon`, so they run on whatever
//! thread pool the caller has installed.

mod binary_op;
mod cast_op;
mod gather_op;
mod gelu_op;
mod layer_norm_op;
mod matmul_op;
mod softmax_op;

pub use binary_op::{binary, BinaryOp};
pub use cast_op::{cast, dequantize};
pub use gather_op::embedding_lookup;
pub use gelu_op::gelu;
pub use layer_norm_op::layer_norm;
pub use matmul_op::{fully_connected, matmul};
pub use softmax_op::softmax;

use crate::{DType, Shape, Tensor, TensorError, TensorView};

/// Checks that a view holds `Float32` data and decodes it.
pub(crate) fn f32_input(op: &'static str, view: &TensorView<'_>) -> Result<Vec<f32>, TensorError> {
    if view.dtype() != DType::Float32 {
        return Err(TensorError::UnsupportedDType {
            op,
            dtype: view.dtype(),
        });
    }
    view.to_vec::<f32>()
}

/// Checks that the output tensor is `Float32` with the expected shape.
pub(crate) fn f32_output(op: &'static str, expected: &Shape, output: &Tensor) -> Result<(), TensorError> {
    if output.dtype() != DType::Float32 {
        return Err(TensorError::UnsupportedDType {
            op,
            dtype: output.dtype(),
        });
    }
    if output.shape() != expected {
        return Err(TensorError::ShapeMismatch {
            op,
            lhs: expected.clone(),
            rhs: output.shape().clone(),
        });
    }
    Ok(())
}
