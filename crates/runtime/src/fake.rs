// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! In-memory stand-ins for the runtime capability.
//!
//! [`FakeGraph`] declares slots directly, counts every writable borrow and
//! execution, and can be told to fail. [`FakeRuntime`] hands out a preset
//! graph or a preset failure. Enabled with the `test-support` feature.

use crate::{GraphInstance, Runtime, RuntimeError, TensorSlotMut, TensorSlotView};
use std::io;
use std::path::{Path, PathBuf};
use tensor_core::{DType, QuantParams, Shape, TensorInfo};

/// A graph instance backed by plain vectors.
///
/// `execute` copies the first input's bytes into the first output when the
/// two have the same byte size, so tests can observe data flow.
#[derive(Debug, Clone, Default)]
pub struct FakeGraph {
    infos: Vec<TensorInfo>,
    data: Vec<Vec<u8>>,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    nodes: usize,
    allocated: bool,
    parallelism: Option<usize>,
    input_borrows: usize,
    executions: usize,
    fail_execute: bool,
}

impl FakeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, dtype: DType, shape: Shape) -> usize {
        self.infos.push(TensorInfo::new(name, dtype, shape));
        self.infos.len() - 1
    }

    /// Declares a graph input slot.
    pub fn with_input(mut self, name: &str, dtype: DType, shape: impl Into<Shape>) -> Self {
        let index = self.push(name, dtype, shape.into());
        self.inputs.push(index);
        self
    }

    /// Declares a graph output slot.
    pub fn with_output(mut self, name: &str, dtype: DType, shape: impl Into<Shape>) -> Self {
        let index = self.push(name, dtype, shape.into());
        self.outputs.push(index);
        self
    }

    /// Attaches quantization parameters to the most recently declared slot.
    pub fn quantized(mut self, params: QuantParams) -> Self {
        if let Some(info) = self.infos.last_mut() {
            info.quantization = Some(params);
        }
        self
    }

    /// Reported node count.
    pub fn with_nodes(mut self, nodes: usize) -> Self {
        self.nodes = nodes;
        self
    }

    /// Makes every `execute` fail.
    pub fn failing_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Last value given to `set_parallelism`.
    pub fn parallelism(&self) -> Option<usize> {
        self.parallelism
    }

    /// Number of writable views handed out by `input_mut`.
    pub fn input_borrows(&self) -> usize {
        self.input_borrows
    }

    pub fn executions(&self) -> usize {
        self.executions
    }

    /// Raw bytes of a slot; empty before allocation.
    pub fn data(&self, index: usize) -> &[u8] {
        self.data.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    fn check_index(&self, index: usize) -> Result<(), RuntimeError> {
        if index < self.infos.len() {
            Ok(())
        } else {
            Err(RuntimeError::NoSuchTensor {
                index,
                len: self.infos.len(),
            })
        }
    }
}

impl GraphInstance for FakeGraph {
    fn allocate(&mut self) -> Result<(), RuntimeError> {
        let mut data = Vec::with_capacity(self.infos.len());
        for (index, info) in self.infos.iter().enumerate() {
            let size = info.byte_size().ok_or_else(|| RuntimeError::UnsizedSlot {
                index,
                name: info.name.clone(),
                dtype: info.dtype,
            })?;
            data.push(vec![0u8; size]);
        }
        self.data = data;
        self.allocated = true;
        Ok(())
    }

    fn set_parallelism(&mut self, threads: usize) -> Result<(), RuntimeError> {
        self.parallelism = Some(threads);
        Ok(())
    }

    fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    fn tensors_len(&self) -> usize {
        self.infos.len()
    }

    fn nodes_len(&self) -> usize {
        self.nodes
    }

    fn tensor(&self, index: usize) -> Result<TensorSlotView<'_>, RuntimeError> {
        self.check_index(index)?;
        let data = self.allocated.then(|| self.data[index].as_slice());
        Ok(TensorSlotView::new(index, &self.infos[index], data))
    }

    fn input_mut(&mut self, index: usize) -> Result<TensorSlotMut<'_>, RuntimeError> {
        self.check_index(index)?;
        if !self.inputs.contains(&index) {
            return Err(RuntimeError::NotAnInput { index });
        }
        if !self.allocated {
            return Err(RuntimeError::NotAllocated);
        }
        self.input_borrows += 1;
        Ok(TensorSlotMut::new(
            index,
            &self.infos[index],
            &mut self.data[index],
        ))
    }

    fn execute(&mut self) -> Result<(), RuntimeError> {
        if !self.allocated {
            return Err(RuntimeError::NotAllocated);
        }
        self.executions += 1;
        if self.fail_execute {
            return Err(RuntimeError::Backend("fake graph configured to fail".into()));
        }
        if let (Some(&i), Some(&o)) = (self.inputs.first(), self.outputs.first()) {
            if i != o && self.data[i].len() == self.data[o].len() {
                let src = self.data[i].clone();
                self.data[o].copy_from_slice(&src);
            }
        }
        Ok(())
    }

    fn dump_state(&self, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "fake graph: {} tensors, {} nodes", self.infos.len(), self.nodes)?;
        writeln!(out, "allocated: {}", self.allocated)
    }
}

/// What [`FakeRuntime::load`] does.
#[derive(Debug, Clone)]
enum LoadBehavior {
    Succeed,
    Fail,
}

/// A model handle produced by [`FakeRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeModel {
    pub path: PathBuf,
}

/// A runtime that returns a preset [`FakeGraph`] for any path.
#[derive(Debug, Clone)]
pub struct FakeRuntime {
    graph: FakeGraph,
    load: LoadBehavior,
    unknown_operator: Option<String>,
}

impl FakeRuntime {
    pub fn new(graph: FakeGraph) -> Self {
        Self {
            graph,
            load: LoadBehavior::Succeed,
            unknown_operator: None,
        }
    }

    /// Every `load` fails as if the file did not exist.
    pub fn failing_load(mut self) -> Self {
        self.load = LoadBehavior::Fail;
        self
    }

    /// Every `build` fails on an unresolvable operator.
    pub fn failing_build(mut self, op: &str) -> Self {
        self.unknown_operator = Some(op.to_string());
        self
    }
}

impl Runtime for FakeRuntime {
    type Model = FakeModel;
    type Graph = FakeGraph;

    fn load(&self, path: &Path) -> Result<FakeModel, RuntimeError> {
        match self.load {
            LoadBehavior::Succeed => Ok(FakeModel {
                path: path.to_path_buf(),
            }),
            LoadBehavior::Fail => Err(model_ir::ModelError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            }
            .into()),
        }
    }

    fn build(&self, _model: FakeModel) -> Result<FakeGraph, RuntimeError> {
        match &self.unknown_operator {
            Some(op) => Err(RuntimeError::UnknownOperator {
                node: 0,
                op: op.clone(),
            }),
            None => Ok(self.graph.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_graph() -> FakeGraph {
        FakeGraph::new()
            .with_input("ids", DType::Int64, vec![1, 4])
            .with_input("segments", DType::Int64, vec![1, 4])
            .with_input("mask", DType::Int64, vec![1, 4])
            .with_output("logits", DType::Int64, vec![1, 4])
    }

    #[test]
    fn test_counts_borrows_and_executions() {
        let mut g = text_graph();
        g.allocate().unwrap();
        g.input_mut(0)
            .unwrap()
            .typed_mut::<i64>()
            .unwrap()
            .copy_from_slice(&[1, 2, 3, 4])
            .unwrap();
        g.execute().unwrap();
        assert_eq!(g.input_borrows(), 1);
        assert_eq!(g.executions(), 1);
        assert_eq!(g.tensor(3).unwrap().to_vec::<i64>().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_failing_execute() {
        let mut g = text_graph().failing_execute();
        g.allocate().unwrap();
        assert!(matches!(g.execute(), Err(RuntimeError::Backend(_))));
    }

    #[test]
    fn test_runtime_failures() {
        let rt = FakeRuntime::new(text_graph()).failing_load();
        assert!(matches!(rt.load(Path::new("m")), Err(RuntimeError::Load(_))));

        let rt = FakeRuntime::new(text_graph()).failing_build("CUSTOM");
        let model = rt.load(Path::new("m")).unwrap();
        assert!(matches!(rt.build(model), Err(RuntimeError::UnknownOperator { .. })));
    }
}
