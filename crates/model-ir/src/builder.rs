// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Programmatic model construction for tooling and tests.

use crate::manifest::{GraphManifest, OperatorDecl, TensorDecl};
use crate::{Model, ModelError};
use std::collections::BTreeMap;
use tensor_core::{DType, Element, QuantParams, Shape};

/// Incrementally declares tensors and operators, then checks the result.
///
/// # Example
/// ```
/// use model_ir::ModelBuilder;
/// use tensor_core::{DType, Shape};
///
/// let mut b = ModelBuilder::new("passthrough");
/// let x = b.input("x", DType::Int64, Shape::matrix(1, 4));
/// let y = b.tensor("y", DType::Float32, Shape::matrix(1, 4));
/// b.operator("CAST", &[x], &[y]);
/// b.output(y);
/// let model = b.build().unwrap();
/// assert_eq!(model.operators().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    name: String,
    tensors: Vec<TensorDecl>,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    operators: Vec<OperatorDecl>,
    constants: BTreeMap<usize, Vec<u8>>,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declares a non-constant slot and returns its index.
    pub fn tensor(&mut self, name: impl Into<String>, dtype: DType, shape: Shape) -> usize {
        self.tensors.push(TensorDecl {
            name: name.into(),
            dtype,
            shape,
            constant: false,
            quantization: None,
        });
        self.tensors.len() - 1
    }

    /// Declares a slot and appends it to the graph inputs.
    pub fn input(&mut self, name: impl Into<String>, dtype: DType, shape: Shape) -> usize {
        let index = self.tensor(name, dtype, shape);
        self.inputs.push(index);
        index
    }

    /// Declares a constant slot filled with `values`.
    pub fn constant<T: Element>(
        &mut self,
        name: impl Into<String>,
        shape: Shape,
        values: &[T],
    ) -> Result<usize, ModelError> {
        let name = name.into();
        if values.len() != shape.num_elements() {
            return Err(ModelError::Constant {
                name,
                detail: format!("{} values supplied for shape {shape}", values.len()),
            });
        }
        Ok(self.constant_bytes(name, T::DTYPE, shape, bytemuck::cast_slice(values).to_vec()))
    }

    /// Declares a constant slot from raw little-endian bytes.
    pub fn constant_bytes(
        &mut self,
        name: impl Into<String>,
        dtype: DType,
        shape: Shape,
        data: Vec<u8>,
    ) -> usize {
        let index = self.tensor(name, dtype, shape);
        self.tensors[index].constant = true;
        self.constants.insert(index, data);
        index
    }

    /// Attaches quantization parameters to a declared slot.
    pub fn quantize(&mut self, index: usize, params: QuantParams) -> &mut Self {
        if let Some(t) = self.tensors.get_mut(index) {
            t.quantization = Some(params);
        }
        self
    }

    pub fn operator(&mut self, op: impl Into<String>, inputs: &[usize], outputs: &[usize]) -> &mut Self {
        self.operators.push(OperatorDecl {
            op: op.into(),
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        });
        self
    }

    pub fn output(&mut self, index: usize) -> &mut Self {
        self.outputs.push(index);
        self
    }

    /// Validates the declarations and produces an immutable [`Model`].
    pub fn build(self) -> Result<Model, ModelError> {
        let manifest = GraphManifest {
            name: self.name,
            tensors: self.tensors,
            inputs: self.inputs,
            outputs: self.outputs,
            operators: self.operators,
        };
        Model::from_parts(manifest, self.constants)
    }
}
