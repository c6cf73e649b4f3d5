// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `edge-infer inspect`: load and build a model, then print its slots,
//! operators and the interpreter state. Nothing is populated or executed.

use crate::GlobalArgs;
use harness::{DiagnosticDumper, HarnessError, Profiler, PHASE_LOAD};
use memory_manager::MemoryBudget;
use runtime::{GraphInstance, Interpreter, Runtime};
use std::path::PathBuf;

pub fn execute(model: PathBuf, global: &GlobalArgs) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             edge-infer · Model Inspector             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let budget = global
        .arena_budget
        .as_deref()
        .map(MemoryBudget::parse)
        .transpose()
        .map_err(|e| HarnessError::Config(format!("invalid arena budget: {e}")))?;
    let interpreter = Interpreter::new().with_arena_budget(budget);

    let profiler = Profiler::new();
    let graph = {
        let _phase = profiler.phase(PHASE_LOAD);
        let loaded = interpreter.load(&model).map_err(HarnessError::ModelLoad)?;
        let mut graph = interpreter.build(loaded).map_err(HarnessError::GraphBuild)?;
        graph.allocate().map_err(HarnessError::GraphBuild)?;
        graph
    };

    // ── Summary ────────────────────────────────────────────────
    let m = graph.model();
    println!("  {}", m.summary());
    println!(
        "  Constants: {:.2} KB",
        m.constant_bytes() as f64 / 1024.0
    );
    println!("  Arena: {}", graph.arena_stats().summary());
    println!();

    // ── Operators ──────────────────────────────────────────────
    println!("  {:<4} {:<18} {:<16} {:<8}", "Idx", "Operator", "Inputs", "Outputs");
    println!("  {}", "-".repeat(50));
    for (i, op) in m.operators().iter().enumerate() {
        println!(
            "  {:<4} {:<18} {:<16} {:<8}",
            i,
            op.op,
            format!("{:?}", op.inputs),
            format!("{:?}", op.outputs),
        );
    }
    println!();

    DiagnosticDumper::new(true).dump_to_stderr(&graph)?;
    Ok(())
}
