// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The reference interpreter: a [`Runtime`] over `model-ir` containers.
//!
//! Nodes execute in declaration order. Each node reads its input slots
//! through borrowed views, computes into a fresh output tensor, and only
//! then copies the result into the output slot, so a node may safely read
//! and write the same intermediate.

use crate::resolver::{self, Node};
use crate::{GraphInstance, Runtime, RuntimeError, TensorSlotMut, TensorSlotView};
use memory_manager::{AllocationStats, BufferGuard, MemoryBudget, TensorArena};
use model_ir::{Model, ModelLoader, TensorDecl};
use std::io;
use std::path::Path;
use std::time::Instant;
use tensor_core::{Tensor, TensorInfo, TensorView};

/// Loads model containers and builds [`InterpreterGraph`]s.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    arena_budget: Option<MemoryBudget>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the total slot memory of every graph this interpreter builds.
    pub fn with_arena_budget(mut self, budget: Option<MemoryBudget>) -> Self {
        self.arena_budget = budget;
        self
    }
}

impl Runtime for Interpreter {
    type Model = Model;
    type Graph = InterpreterGraph;

    fn load(&self, path: &Path) -> Result<Model, RuntimeError> {
        Ok(ModelLoader::load(path)?)
    }

    fn build(&self, model: Model) -> Result<InterpreterGraph, RuntimeError> {
        InterpreterGraph::new(model, TensorArena::new(self.arena_budget))
    }
}

/// An executable graph built from one [`Model`].
pub struct InterpreterGraph {
    model: Model,
    infos: Vec<TensorInfo>,
    nodes: Vec<Node>,
    arena: TensorArena,
    /// One guard per tensor, present once allocated.
    slots: Option<Vec<BufferGuard>>,
    threads: usize,
    pool: Option<rayon::ThreadPool>,
    executions: usize,
}

impl InterpreterGraph {
    /// Resolves every operator of `model`; slots stay unallocated.
    pub fn new(model: Model, arena: TensorArena) -> Result<Self, RuntimeError> {
        let infos: Vec<TensorInfo> = model.tensors().iter().map(TensorDecl::info).collect();
        let nodes = model
            .operators()
            .iter()
            .enumerate()
            .map(|(i, decl)| resolver::resolve(i, decl))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            model = model.name(),
            tensors = infos.len(),
            nodes = nodes.len(),
            "graph built"
        );
        Ok(Self {
            model,
            infos,
            nodes,
            arena,
            slots: None,
            threads: 0,
            pool: None,
            executions: 0,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn is_allocated(&self) -> bool {
        self.slots.is_some()
    }

    /// Worker count set by [`GraphInstance::set_parallelism`]; 0 = default.
    pub fn parallelism(&self) -> usize {
        self.threads
    }

    pub fn executions(&self) -> usize {
        self.executions
    }

    pub fn arena_stats(&self) -> AllocationStats {
        self.arena.stats()
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

    fn role(&self, index: usize) -> &'static str {
        if self.model.inputs().contains(&index) {
            "input"
        } else if self.model.outputs().contains(&index) {
            "output"
        } else if self.model.constant_data(index).is_some() {
            "constant"
        } else {
            "intermediate"
        }
    }
}

impl GraphInstance for InterpreterGraph {
    fn allocate(&mut self) -> Result<(), RuntimeError> {
        if self.slots.is_some() {
            tracing::debug!("tensors already allocated");
            return Ok(());
        }

        let mut slots = Vec::with_capacity(self.infos.len());
        for (index, info) in self.infos.iter().enumerate() {
            let size = info.byte_size().ok_or_else(|| RuntimeError::UnsizedSlot {
                index,
                name: info.name.clone(),
                dtype: info.dtype,
            })?;
            let mut guard = self
                .arena
                .allocate(size)
                .map_err(|source| RuntimeError::Allocation { index, source })?;
            if let Some(data) = self.model.constant_data(index) {
                if data.len() != size {
                    return Err(tensor_core::TensorError::BufferSizeMismatch {
                        expected: size,
                        actual: data.len(),
                    }
                    .into());
                }
                guard.as_mut_slice().copy_from_slice(data);
            }
            slots.push(guard);
        }

        tracing::info!(
            bytes = self.arena.allocated_bytes(),
            slots = slots.len(),
            "tensors allocated"
        );
        self.slots = Some(slots);
        Ok(())
    }

    fn set_parallelism(&mut self, threads: usize) -> Result<(), RuntimeError> {
        self.pool = if threads == 0 {
            None
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("edge-infer-{i}"))
                .build()
                .map_err(|e| RuntimeError::ThreadPool {
                    threads,
                    detail: e.to_string(),
                })?;
            Some(pool)
        };
        self.threads = threads;
        tracing::debug!(threads, "parallelism set");
        Ok(())
    }

    fn inputs(&self) -> &[usize] {
        self.model.inputs()
    }

    fn outputs(&self) -> &[usize] {
        self.model.outputs()
    }

    fn tensors_len(&self) -> usize {
        self.infos.len()
    }

    fn nodes_len(&self) -> usize {
        self.nodes.len()
    }

    fn tensor(&self, index: usize) -> Result<TensorSlotView<'_>, RuntimeError> {
        self.check_index(index)?;
        let data = self.slots.as_ref().map(|s| s[index].as_slice());
        Ok(TensorSlotView::new(index, &self.infos[index], data))
    }

    fn input_mut(&mut self, index: usize) -> Result<TensorSlotMut<'_>, RuntimeError> {
        self.check_index(index)?;
        if !self.model.inputs().contains(&index) {
            return Err(RuntimeError::NotAnInput { index });
        }
        let slots = self.slots.as_mut().ok_or(RuntimeError::NotAllocated)?;
        Ok(TensorSlotMut::new(
            index,
            &self.infos[index],
            slots[index].as_mut_slice(),
        ))
    }

    fn execute(&mut self) -> Result<(), RuntimeError> {
        let slots = self.slots.as_mut().ok_or(RuntimeError::NotAllocated)?;
        let (nodes, infos) = (&self.nodes, &self.infos);

        let start = Instant::now();
        match &self.pool {
            Some(pool) => pool.install(|| run_nodes(nodes, infos, slots))?,
            None => run_nodes(nodes, infos, slots)?,
        }
        self.executions += 1;
        tracing::info!(
            nodes = nodes.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "graph executed"
        );
        Ok(())
    }

    fn dump_state(&self, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "=== Interpreter state: model '{}' ===", self.model.name())?;
        writeln!(out, "Inputs: {:?}", self.model.inputs())?;
        writeln!(out, "Outputs: {:?}", self.model.outputs())?;
        writeln!(out, "Tensors: {}", self.infos.len())?;
        for (index, info) in self.infos.iter().enumerate() {
            let bytes = info
                .byte_size()
                .map_or_else(|| "unsized".to_string(), |b| format!("{b} bytes"));
            write!(
                out,
                "  [{index:>3}] {:<24} {:<8} {:<16} {bytes} ({})",
                info.name,
                info.dtype,
                info.shape.to_string(),
                self.role(index),
            )?;
            if let Some(q) = info.quantization {
                write!(out, " scale={} zero_point={}", q.scale, q.zero_point)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "Nodes: {}", self.nodes.len())?;
        for (index, node) in self.nodes.iter().enumerate() {
            writeln!(
                out,
                "  [{index:>3}] {:<18} inputs={:?} outputs=[{}]",
                node.op.name(),
                node.inputs,
                node.output,
            )?;
        }
        match self.threads {
            0 => writeln!(out, "Parallelism: runtime default")?,
            n => writeln!(out, "Parallelism: {n} threads")?,
        }
        writeln!(
            out,
            "Allocated: {} ({} bytes live)",
            if self.is_allocated() { "yes" } else { "no" },
            self.arena.allocated_bytes()
        )?;
        if let Some(budget) = self.arena.budget() {
            writeln!(out, "Arena budget: {budget}")?;
        }
        writeln!(out, "Arena: {}", self.arena.stats().summary())?;
        writeln!(out, "Executions: {}", self.executions)
    }
}

fn run_nodes(
    nodes: &[Node],
    infos: &[TensorInfo],
    slots: &mut [BufferGuard],
) -> Result<(), RuntimeError> {
    for (index, node) in nodes.iter().enumerate() {
        let kernel_err = |source| RuntimeError::Kernel {
            node: index,
            op: node.op.name(),
            source,
        };
        let out_info = &infos[node.output];

        let result = {
            let views: Vec<TensorView<'_>> = node
                .inputs
                .iter()
                .map(|&t| TensorView::from_parts(&infos[t].shape, infos[t].dtype, slots[t].as_slice()))
                .collect();
            let quant = node.inputs.first().and_then(|&t| infos[t].quantization);
            let mut out =
                Tensor::zeros(out_info.shape.clone(), out_info.dtype).map_err(kernel_err)?;
            node.op.run(&views, quant, &mut out).map_err(kernel_err)?;
            out
        };

        slots[node.output]
            .as_mut_slice()
            .copy_from_slice(result.as_bytes());
        tracing::debug!(node = index, op = node.op.name(), output = node.output, "node executed");
    }
    Ok(())
}

impl std::fmt::Debug for InterpreterGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpreterGraph")
            .field("model", &self.model.name())
            .field("tensors", &self.infos.len())
            .field("nodes", &self.nodes.len())
            .field("allocated", &self.is_allocated())
            .field("threads", &self.threads)
            .finish()
    }
}
