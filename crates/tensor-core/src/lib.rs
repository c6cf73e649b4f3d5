// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Element types, shapes and typed buffer access for edge-infer.
//!
//! This crate provides:
//! - [`DType`] — the full set of declared element types a model file may use,
//!   with their on-disk codes and byte widths.
//! - [`Element`] — the link between a Rust primitive and its [`DType`].
//! - [`TypedView`] / [`TypedViewMut`] — bounds- and type-checked access to
//!   raw byte buffers of any alignment.
//! - [`Tensor`] / [`TensorView`] — owned and borrowed tensor storage.
//! - Reference f32 kernels in [`ops`]: dense layers, softmax, layer norm,
//!   GELU, broadcast arithmetic, embedding lookup and casts.

mod dtype;
mod error;
pub mod ops;
mod quant;
mod shape;
mod tensor;

pub use dtype::{DType, Element};
pub use error::TensorError;
pub use quant::QuantParams;
pub use shape::Shape;
pub use tensor::{Tensor, TensorInfo, TensorView, TypedView, TypedViewMut};
