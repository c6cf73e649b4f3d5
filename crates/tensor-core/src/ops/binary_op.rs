// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-wise binary arithmetic with numpy-style broadcasting.

use rayon::prelude::*;

use crate::{DType, Element, Shape, Tensor, TensorError, TensorView};

/// Arithmetic performed by [`binary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Mul,
}

impl BinaryOp {
    fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Mul => "mul",
        }
    }
}

/// Computes `output = lhs <op> rhs`, broadcasting the inputs to the output
/// shape.
///
/// Both inputs and the output must share one element type; `Float32`,
/// `Int32` and `Int64` are supported. Integer arithmetic wraps.
pub fn binary(
    op: BinaryOp,
    lhs: &TensorView<'_>,
    rhs: &TensorView<'_>,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let name = op.name();
    let out_shape = lhs
        .shape()
        .broadcast(rhs.shape())
        .ok_or_else(|| TensorError::ShapeMismatch {
            op: name,
            lhs: lhs.shape().clone(),
            rhs: rhs.shape().clone(),
        })?;
    if output.shape() != &out_shape {
        return Err(TensorError::ShapeMismatch {
            op: name,
            lhs: out_shape,
            rhs: output.shape().clone(),
        });
    }
    for dtype in [rhs.dtype(), output.dtype()] {
        if dtype != lhs.dtype() {
            return Err(TensorError::TypeMismatch {
                declared: lhs.dtype(),
                requested: dtype,
            });
        }
    }

    match (op, lhs.dtype()) {
        (BinaryOp::Add, DType::Float32) => apply::<f32>(lhs, rhs, output, |a, b| a + b),
        (BinaryOp::Mul, DType::Float32) => apply::<f32>(lhs, rhs, output, |a, b| a * b),
        (BinaryOp::Add, DType::Int32) => apply::<i32>(lhs, rhs, output, i32::wrapping_add),
        (BinaryOp::Mul, DType::Int32) => apply::<i32>(lhs, rhs, output, i32::wrapping_mul),
        (BinaryOp::Add, DType::Int64) => apply::<i64>(lhs, rhs, output, i64::wrapping_add),
        (BinaryOp::Mul, DType::Int64) => apply::<i64>(lhs, rhs, output, i64::wrapping_mul),
        (_, dtype) => Err(TensorError::UnsupportedDType { op: name, dtype }),
    }
}

fn apply<T: Element + Send + Sync>(
    lhs: &TensorView<'_>,
    rhs: &TensorView<'_>,
    output: &mut Tensor,
    f: impl Fn(T, T) -> T + Send + Sync,
) -> Result<(), TensorError> {
    let a = lhs.to_vec::<T>()?;
    let b = rhs.to_vec::<T>()?;
    let out_shape = output.shape().clone();

    let result: Vec<T> = if lhs.shape() == &out_shape && rhs.shape() == &out_shape {
        a.par_iter().zip(b.par_iter()).map(|(&x, &y)| f(x, y)).collect()
    } else {
        let a_map = BroadcastMap::new(lhs.shape(), &out_shape);
        let b_map = BroadcastMap::new(rhs.shape(), &out_shape);
        (0..out_shape.num_elements())
            .into_par_iter()
            .map(|i| f(a[a_map.source(i)], b[b_map.source(i)]))
            .collect()
    };

    output.typed_mut::<T>()?.copy_from_slice(&result)
}

/// Maps flat indices of a broadcast output back to the flat index of one
/// input. Broadcast axes get a source stride of zero.
struct BroadcastMap {
    out_strides: Vec<usize>,
    src_strides: Vec<usize>,
}

impl BroadcastMap {
    fn new(src: &Shape, out: &Shape) -> Self {
        let pad = out.rank() - src.rank();
        let natural = src.strides();
        let src_strides = (0..out.rank())
            .map(|axis| {
                if axis < pad || src.dims()[axis - pad] == 1 {
                    0
                } else {
                    natural[axis - pad]
                }
            })
            .collect();
        Self {
            out_strides: out.strides(),
            src_strides,
        }
    }

    fn source(&self, mut flat: usize) -> usize {
        let mut idx = 0;
        for (&os, &ss) in self.out_strides.iter().zip(&self.src_strides) {
            let coord = flat / os;
            flat %= os;
            idx += coord * ss;
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_same_shape() {
        let a = Tensor::from_values(Shape::vector(3), &[1.0f32, 2.0, 3.0]).unwrap();
        let b = Tensor::from_values(Shape::vector(3), &[0.5f32, 0.5, 0.5]).unwrap();
        let mut out = Tensor::zeros(Shape::vector(3), DType::Float32).unwrap();
        binary(BinaryOp::Add, &a.view(), &b.view(), &mut out).unwrap();
        assert_eq!(out.to_vec::<f32>().unwrap(), vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_add_broadcasts_row_vector() {
        let a = Tensor::from_values(Shape::matrix(2, 3), &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = Tensor::from_values(Shape::vector(3), &[10.0f32, 20.0, 30.0]).unwrap();
        let mut out = Tensor::zeros(Shape::matrix(2, 3), DType::Float32).unwrap();
        binary(BinaryOp::Add, &a.view(), &b.view(), &mut out).unwrap();
        assert_eq!(
            out.to_vec::<f32>().unwrap(),
            vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]
        );
    }

    #[test]
    fn test_mul_broadcasts_column() {
        let a = Tensor::from_values(Shape::matrix(2, 1), &[2i64, 3]).unwrap();
        let b = Tensor::from_values(Shape::matrix(1, 3), &[1i64, 2, 3]).unwrap();
        let mut out = Tensor::zeros(Shape::matrix(2, 3), DType::Int64).unwrap();
        binary(BinaryOp::Mul, &a.view(), &b.view(), &mut out).unwrap();
        assert_eq!(out.to_vec::<i64>().unwrap(), vec![2, 4, 6, 3, 6, 9]);
    }

    #[test]
    fn test_incompatible_shapes() {
        let a = Tensor::zeros(Shape::vector(3), DType::Float32).unwrap();
        let b = Tensor::zeros(Shape::vector(2), DType::Float32).unwrap();
        let mut out = Tensor::zeros(Shape::vector(3), DType::Float32).unwrap();
        assert!(matches!(
            binary(BinaryOp::Add, &a.view(), &b.view(), &mut out),
            Err(TensorError::ShapeMismatch { op: "add", .. })
        ));
    }

    #[test]
    fn test_mixed_dtypes_rejected() {
        let a = Tensor::zeros(Shape::vector(2), DType::Float32).unwrap();
        let b = Tensor::zeros(Shape::vector(2), DType::Int32).unwrap();
        let mut out = Tensor::zeros(Shape::vector(2), DType::Float32).unwrap();
        assert!(matches!(
            binary(BinaryOp::Mul, &a.view(), &b.view(), &mut out),
            Err(TensorError::TypeMismatch { .. })
        ));
    }
}
