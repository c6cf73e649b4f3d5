// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the runtime capability.

use tensor_core::DType;

/// Errors raised by a runtime or one of its graph instances.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The model file could not be loaded.
    #[error("invalid or unreadable model")]
    Load(#[from] model_ir::ModelError),

    /// An operator name has no entry in the resolver table.
    #[error("node {node}: unknown operator '{op}'")]
    UnknownOperator { node: usize, op: String },

    /// An operator is wired with the wrong number of tensors.
    #[error("node {node} ({op}): expected {expected} {role}, got {actual}")]
    Arity {
        node: usize,
        op: &'static str,
        role: &'static str,
        expected: &'static str,
        actual: usize,
    },

    /// A slot has an element type with no fixed width.
    #[error("tensor {index} ('{name}'): cannot allocate {dtype} storage")]
    UnsizedSlot {
        index: usize,
        name: String,
        dtype: DType,
    },

    /// Slot memory could not be reserved.
    #[error("allocation failed for tensor {index}")]
    Allocation {
        index: usize,
        #[source]
        source: memory_manager::MemoryError,
    },

    /// The worker pool for the requested thread count could not be built.
    #[error("cannot build a {threads}-thread worker pool: {detail}")]
    ThreadPool { threads: usize, detail: String },

    /// Slot data was requested before `allocate`.
    #[error("tensors are not allocated")]
    NotAllocated,

    /// An index does not name a tensor slot.
    #[error("tensor index {index} out of range ({len} tensors)")]
    NoSuchTensor { index: usize, len: usize },

    /// A writable view was requested for a slot that is not a graph input.
    #[error("tensor {index} is not a graph input")]
    NotAnInput { index: usize },

    /// A typed view did not match the slot's declared element type or extent.
    #[error(transparent)]
    Tensor(#[from] tensor_core::TensorError),

    /// A kernel failed during `execute`.
    #[error("node {node} ({op}) failed")]
    Kernel {
        node: usize,
        op: &'static str,
        #[source]
        source: tensor_core::TensorError,
    },

    /// Backend-specific execution failure.
    #[error("execution failed: {0}")]
    Backend(String),
}
