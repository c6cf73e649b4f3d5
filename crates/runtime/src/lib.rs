// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The execution capability the harness drives.
//!
//! - [`Runtime`] loads a model file and builds a [`GraphInstance`] from it.
//! - [`GraphInstance`] owns the tensor slots: allocation, typed writes to
//!   graph inputs, one forward pass, read-back and a state dump.
//! - [`Interpreter`] is the reference implementation over `model-ir`
//!   containers, with a fixed table of built-in operators ([`BuiltinOp`]).
//!   Kernels run on a `rayon` pool sized by the parallelism hint.
//! - `fake` (feature `test-support`) provides an in-memory graph for tests.

mod capability;
mod error;
mod interpreter;
mod resolver;
mod slot;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use capability::{GraphInstance, Runtime};
pub use error::RuntimeError;
pub use interpreter::{Interpreter, InterpreterGraph};
pub use resolver::{resolve, BuiltinOp, Node, LAYER_NORM_EPS};
pub use slot::{TensorSlotMut, TensorSlotView};
