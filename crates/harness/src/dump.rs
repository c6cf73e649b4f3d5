// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Opt-in diagnostic dump of a graph instance.
//!
//! The dumper only ever holds a shared reference to the graph, so it cannot
//! change slot shapes, types or contents.

use runtime::GraphInstance;
use std::io::{self, Write};

/// Prints tensor tables and the runtime's own state when enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticDumper {
    trace_enabled: bool,
}

impl DiagnosticDumper {
    pub fn new(trace_enabled: bool) -> Self {
        Self { trace_enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.trace_enabled
    }

    /// Writes the dump to `out`. Does nothing when disabled.
    ///
    /// Sections, in order: tensor and node counts with the first input's
    /// name; one line per slot (`index: name, bytes, type code, scale,
    /// zero point`); inputs and outputs with their sequence-length
    /// dimension (`shape[1]`, `-` when rank < 2) and type code; then
    /// [`GraphInstance::dump_state`].
    pub fn dump<G>(&self, graph: &G, out: &mut dyn Write) -> io::Result<()>
    where
        G: GraphInstance + ?Sized,
    {
        if !self.trace_enabled {
            return Ok(());
        }

        let inputs = graph.inputs();
        writeln!(out, "tensors size: {}", graph.tensors_len())?;
        writeln!(out, "nodes size: {}", graph.nodes_len())?;
        writeln!(out, "inputs: {}", inputs.len())?;
        if let Some(view) = inputs.first().and_then(|&i| graph.tensor(i).ok()) {
            writeln!(out, "input(0) name: {}", view.name())?;
        }

        for index in 0..graph.tensors_len() {
            let Ok(view) = graph.tensor(index) else {
                continue;
            };
            let quant = view.quantization();
            writeln!(
                out,
                "{index}: {}, {}, {}, {}, {}",
                view.name(),
                view.byte_size(),
                view.dtype().code(),
                quant.scale,
                quant.zero_point
            )?;
        }

        for (label, slots) in [("input", inputs), ("output", graph.outputs())] {
            writeln!(out, "number of {label}s: {}", slots.len())?;
            for (position, &slot) in slots.iter().enumerate() {
                writeln!(out, "{label}[{position}]: {slot}")?;
                let Ok(view) = graph.tensor(slot) else {
                    continue;
                };
                let seq = view
                    .shape()
                    .dim(1)
                    .map_or_else(|| "-".to_string(), |d| d.to_string());
                let title = if label == "input" { "Input" } else { "Output" };
                writeln!(out, "{title} dims: {seq}")?;
                writeln!(out, "{title} type: {}", view.dtype().code())?;
            }
        }

        graph.dump_state(out)
    }

    /// Writes the dump to standard error.
    pub fn dump_to_stderr<G>(&self, graph: &G) -> io::Result<()>
    where
        G: GraphInstance + ?Sized,
    {
        if !self.trace_enabled {
            return Ok(());
        }
        let stderr = io::stderr();
        let mut lock = stderr.lock();
        self.dump(graph, &mut lock)
    }
}
