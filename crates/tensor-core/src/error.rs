// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor storage and kernels.

use crate::{DType, Shape};

/// Errors that can occur when viewing tensor storage or running a kernel.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer size does not match the expected size for the given shape and dtype.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Two tensors have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// The requested data type is not supported for this operation.
    #[error("unsupported dtype {dtype} for {op}")]
    UnsupportedDType { op: &'static str, dtype: DType },

    /// The shape holds more bytes than can ever be allocated.
    #[error("{dtype} tensor of shape {shape} is too large to allocate")]
    TooLarge { shape: Shape, dtype: DType },

    /// A typed view was requested with a primitive that does not match the
    /// buffer's declared element type.
    #[error("type mismatch: buffer holds {declared}, view requested {requested}")]
    TypeMismatch { declared: DType, requested: DType },

    /// An element access fell outside the declared extent.
    #[error("index {index} out of bounds for {len} elements")]
    OutOfBounds { index: usize, len: usize },

    /// A numeric computation failed (bad index, overflow, NaN, ...).
    #[error("numeric error in {op}: {detail}")]
    Numeric { op: &'static str, detail: String },
}
