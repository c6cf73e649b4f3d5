// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The built-in operator table of the reference interpreter.
//!
//! Resolution checks names and arity when a graph is built; element types
//! and shapes are checked by the kernels when the graph executes.

use crate::RuntimeError;
use model_ir::OperatorDecl;
use std::ops::RangeInclusive;
use tensor_core::ops::{self, BinaryOp};
use tensor_core::{QuantParams, Tensor, TensorError, TensorView};

/// Variance floor used by `LAYER_NORM`.
pub const LAYER_NORM_EPS: f32 = 1e-5;

/// Operators the interpreter can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOp {
    Add,
    Mul,
    Cast,
    Dequantize,
    EmbeddingLookup,
    FullyConnected,
    Gelu,
    LayerNorm,
    Softmax,
    Reshape,
}

impl BuiltinOp {
    pub const ALL: [BuiltinOp; 10] = [
        BuiltinOp::Add,
        BuiltinOp::Mul,
        BuiltinOp::Cast,
        BuiltinOp::Dequantize,
        BuiltinOp::EmbeddingLookup,
        BuiltinOp::FullyConnected,
        BuiltinOp::Gelu,
        BuiltinOp::LayerNorm,
        BuiltinOp::Softmax,
        BuiltinOp::Reshape,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinOp::Add => "ADD",
            BuiltinOp::Mul => "MUL",
            BuiltinOp::Cast => "CAST",
            BuiltinOp::Dequantize => "DEQUANTIZE",
            BuiltinOp::EmbeddingLookup => "EMBEDDING_LOOKUP",
            BuiltinOp::FullyConnected => "FULLY_CONNECTED",
            BuiltinOp::Gelu => "GELU",
            BuiltinOp::LayerNorm => "LAYER_NORM",
            BuiltinOp::Softmax => "SOFTMAX",
            BuiltinOp::Reshape => "RESHAPE",
        }
    }

    /// Looks up an operator by its exact upper-case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Accepted input counts. Every operator has exactly one output.
    fn input_arity(self) -> RangeInclusive<usize> {
        match self {
            BuiltinOp::Add | BuiltinOp::Mul | BuiltinOp::EmbeddingLookup => 2..=2,
            BuiltinOp::Cast | BuiltinOp::Dequantize | BuiltinOp::Gelu | BuiltinOp::Softmax => 1..=1,
            BuiltinOp::FullyConnected => 2..=3,
            BuiltinOp::LayerNorm => 3..=3,
            // The optional second input is a shape tensor; the declared
            // output shape is authoritative.
            BuiltinOp::Reshape => 1..=2,
        }
    }

    /// Runs the kernel. `inputs` are in node order; `input_quant` carries the
    /// first input's quantization parameters.
    pub(crate) fn run(
        self,
        inputs: &[TensorView<'_>],
        input_quant: Option<QuantParams>,
        output: &mut Tensor,
    ) -> Result<(), TensorError> {
        match self {
            BuiltinOp::Add => ops::binary(BinaryOp::Add, &inputs[0], &inputs[1], output),
            BuiltinOp::Mul => ops::binary(BinaryOp::Mul, &inputs[0], &inputs[1], output),
            BuiltinOp::Cast => ops::cast(&inputs[0], output),
            BuiltinOp::Dequantize => {
                let params = input_quant.ok_or_else(|| TensorError::Numeric {
                    op: "dequantize",
                    detail: "input has no quantization parameters".into(),
                })?;
                ops::dequantize(&inputs[0], params, output)
            }
            BuiltinOp::EmbeddingLookup => ops::embedding_lookup(&inputs[0], &inputs[1], output),
            BuiltinOp::FullyConnected => {
                ops::fully_connected(&inputs[0], &inputs[1], inputs.get(2), output)
            }
            BuiltinOp::Gelu => ops::gelu(&inputs[0], output),
            BuiltinOp::LayerNorm => {
                ops::layer_norm(&inputs[0], &inputs[1], &inputs[2], LAYER_NORM_EPS, output)
            }
            BuiltinOp::Softmax => ops::softmax(&inputs[0], output),
            BuiltinOp::Reshape => reshape(&inputs[0], output),
        }
    }
}

/// Byte-preserving reinterpretation into the output's declared shape.
fn reshape(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    if input.dtype() != output.dtype() {
        return Err(TensorError::TypeMismatch {
            declared: output.dtype(),
            requested: input.dtype(),
        });
    }
    if input.as_bytes().len() != output.size_bytes() {
        return Err(TensorError::ShapeMismatch {
            op: "reshape",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }
    output.as_bytes_mut().copy_from_slice(input.as_bytes());
    Ok(())
}

/// A resolved operator node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub op: BuiltinOp,
    pub inputs: Vec<usize>,
    pub output: usize,
}

/// Resolves one declared operator against the built-in table.
pub fn resolve(node: usize, decl: &OperatorDecl) -> Result<Node, RuntimeError> {
    let op = BuiltinOp::from_name(&decl.op).ok_or_else(|| RuntimeError::UnknownOperator {
        node,
        op: decl.op.clone(),
    })?;

    let arity = op.input_arity();
    if !arity.contains(&decl.inputs.len()) {
        let expected = match (*arity.start(), *arity.end()) {
            (1, 1) => "1",
            (2, 2) => "2",
            (3, 3) => "3",
            (1, 2) => "1 or 2",
            _ => "2 or 3",
        };
        return Err(RuntimeError::Arity {
            node,
            op: op.name(),
            role: "inputs",
            expected,
            actual: decl.inputs.len(),
        });
    }
    let &[output] = decl.outputs.as_slice() else {
        return Err(RuntimeError::Arity {
            node,
            op: op.name(),
            role: "outputs",
            expected: "1",
            actual: decl.outputs.len(),
        });
    };

    Ok(Node {
        op,
        inputs: decl.inputs.clone(),
        output,
    })
}
