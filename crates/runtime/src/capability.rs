// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The runtime capability consumed by the harness.
//!
//! ```text
//! Runtime::load(path) ──► Model
//!                           │  Runtime::build(model)   (consumes the model)
//!                           ▼
//!                     GraphInstance
//!                           │  allocate() → set_parallelism(n)
//!                           │  input_mut(i) writes
//!                           │  execute()
//!                           ▼
//!                     tensor(i) reads
//! ```

use crate::{RuntimeError, TensorSlotMut, TensorSlotView};
use std::io;
use std::path::Path;

/// Loads models and turns them into executable graph instances.
pub trait Runtime {
    /// An immutable, loaded model.
    type Model;
    /// The executable built from one model.
    type Graph: GraphInstance;

    /// Reads the file fully and checks its integrity.
    fn load(&self, path: &Path) -> Result<Self::Model, RuntimeError>;

    /// Resolves every operator of `model`. Taking the model by value makes
    /// each model buildable exactly once.
    fn build(&self, model: Self::Model) -> Result<Self::Graph, RuntimeError>;
}

/// One executable graph: owns its tensor slots and scratch memory.
///
/// Object safe, so diagnostics and population strategies can work with
/// `&dyn GraphInstance` regardless of the backing runtime.
pub trait GraphInstance {
    /// Assigns memory to every slot from its declared shape and copies
    /// constant data in. Must precede writes and `execute`.
    fn allocate(&mut self) -> Result<(), RuntimeError>;

    /// Advisory worker count for `execute`; 0 selects the runtime default.
    fn set_parallelism(&mut self, threads: usize) -> Result<(), RuntimeError>;

    /// Graph input slot indices, in declaration order.
    fn inputs(&self) -> &[usize];

    /// Graph output slot indices, in declaration order.
    fn outputs(&self) -> &[usize];

    fn tensors_len(&self) -> usize;

    fn nodes_len(&self) -> usize;

    /// Read-only descriptor and data of any slot.
    fn tensor(&self, index: usize) -> Result<TensorSlotView<'_>, RuntimeError>;

    /// Writable view of an allocated graph-input slot.
    fn input_mut(&mut self, index: usize) -> Result<TensorSlotMut<'_>, RuntimeError>;

    /// One forward pass. Does not check that inputs were written.
    fn execute(&mut self) -> Result<(), RuntimeError>;

    /// Writes the runtime's own description of its internal state.
    fn dump_state(&self, out: &mut dyn io::Write) -> io::Result<()>;
}
