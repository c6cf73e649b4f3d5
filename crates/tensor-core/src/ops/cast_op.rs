// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Numeric conversion between element types.

use crate::{DType, QuantParams, Tensor, TensorError, TensorView};

/// Decoded elements, widened to one integer lane or one float lane.
enum Lanes {
    Int(Vec<i128>),
    Float(Vec<f64>),
}

fn decode(op: &'static str, view: &TensorView<'_>) -> Result<Lanes, TensorError> {
    macro_rules! ints {
        ($t:ty) => {
            Lanes::Int(view.typed::<$t>()?.iter().map(i128::from).collect())
        };
    }
    Ok(match view.dtype() {
        DType::Int8 => ints!(i8),
        DType::UInt8 => ints!(u8),
        DType::Int16 => ints!(i16),
        DType::UInt16 => ints!(u16),
        DType::Int32 => ints!(i32),
        DType::UInt32 => ints!(u32),
        DType::Int64 => ints!(i64),
        DType::UInt64 => ints!(u64),
        DType::Bool => Lanes::Int(view.as_bytes().iter().map(|&b| i128::from(b != 0)).collect()),
        DType::Float32 => Lanes::Float(view.typed::<f32>()?.iter().map(f64::from).collect()),
        DType::Float64 => Lanes::Float(view.to_vec::<f64>()?),
        dtype => return Err(TensorError::UnsupportedDType { op, dtype }),
    })
}

fn encode(op: &'static str, lanes: Lanes, output: &mut Tensor) -> Result<(), TensorError> {
    // Integer targets truncate (wrapping for ints, saturating for floats),
    // the same as an `as` conversion.
    macro_rules! store {
        ($t:ty) => {{
            let values: Vec<$t> = match lanes {
                Lanes::Int(v) => v.into_iter().map(|x| x as $t).collect(),
                Lanes::Float(v) => v.into_iter().map(|x| x as $t).collect(),
            };
            output.typed_mut::<$t>()?.copy_from_slice(&values)
        }};
    }
    match output.dtype() {
        DType::Int8 => store!(i8),
        DType::UInt8 => store!(u8),
        DType::Int16 => store!(i16),
        DType::UInt16 => store!(u16),
        DType::Int32 => store!(i32),
        DType::UInt32 => store!(u32),
        DType::Int64 => store!(i64),
        DType::UInt64 => store!(u64),
        DType::Float32 => store!(f32),
        DType::Float64 => store!(f64),
        DType::Bool => {
            let bytes: Vec<u8> = match lanes {
                Lanes::Int(v) => v.into_iter().map(|x| u8::from(x != 0)).collect(),
                Lanes::Float(v) => v.into_iter().map(|x| u8::from(x != 0.0)).collect(),
            };
            output.as_bytes_mut().copy_from_slice(&bytes);
            Ok(())
        }
        dtype => Err(TensorError::UnsupportedDType { op, dtype }),
    }
}

/// Converts `input` element-wise into the element type of `output`.
///
/// Shapes must match. Supported types are the fixed-width integers,
/// `Bool`, `Float32` and `Float64`.
pub fn cast(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "cast",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }
    let lanes = decode("cast", input)?;
    encode("cast", lanes, output)
}

/// Maps quantized integers to `Float32` with `params`.
pub fn dequantize(
    input: &TensorView<'_>,
    params: QuantParams,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    super::f32_output("dequantize", input.shape(), output)?;
    let Lanes::Int(values) = decode("dequantize", input)? else {
        return Err(TensorError::UnsupportedDType {
            op: "dequantize",
            dtype: input.dtype(),
        });
    };
    let real: Vec<f32> = values
        .into_iter()
        .map(|q| params.dequantize(q as i64))
        .collect();
    output.typed_mut::<f32>()?.copy_from_slice(&real)
}
