// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared plumbing.

pub mod inspect;
pub mod run;
pub mod synthetic;
pub mod text;

use crate::GlobalArgs;
use anyhow::Context;
use harness::{Harness, HarnessConfig};
use runtime::GraphInstance;
use tensor_core::DType;
use tracing_subscriber::EnvFilter;

/// Environment toggle for the diagnostic dump; enabled only by exactly `1`.
pub const TRACE_ENV: &str = "EDGE_INFER_TRACE_MODEL";

/// Installs the stderr `fmt` subscriber. `RUST_LOG` wins; otherwise the
/// `-v` count picks the level.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .init();
}

/// `true` when the trace toggle is set to exactly `1`.
pub fn trace_requested() -> bool {
    trace_enabled_from(std::env::var(TRACE_ENV).ok().as_deref())
}

fn trace_enabled_from(value: Option<&str>) -> bool {
    value == Some("1")
}

/// Applies command-line overrides and the trace toggle to a configuration.
pub fn apply_overrides(config: &mut HarnessConfig, global: &GlobalArgs) {
    if let Some(threads) = global.threads {
        config.num_threads = Some(usize::from(threads));
    }
    if let Some(budget) = &global.arena_budget {
        config.arena_budget = Some(budget.clone());
    }
    config.trace_enabled |= trace_requested();
}

/// Runs one configuration end to end and prints the outputs.
pub fn run_config(config: &HarnessConfig) -> anyhow::Result<()> {
    tracing::info!(
        model = %config.model_path.display(),
        mode = ?config.mode,
        threads = config.resolve_threads(),
        "starting run"
    );
    let done = Harness::from_config(config)?
        .run(&config.model_path)
        .with_context(|| format!("model '{}'", config.model_path.display()))?;

    println!("  {}", done.report().summary());
    print_outputs(done.graph())?;
    Ok(())
}

/// Prints every output slot with a preview of its values.
pub fn print_outputs(graph: &dyn GraphInstance) -> anyhow::Result<()> {
    println!("  Outputs:");
    for &slot in graph.outputs() {
        let view = graph.tensor(slot)?;
        let preview = match view.dtype() {
            DType::Float32 => preview(&view.to_vec::<f32>()?),
            DType::Int32 => preview(&view.to_vec::<i32>()?),
            DType::Int64 => preview(&view.to_vec::<i64>()?),
            DType::UInt8 => preview(&view.to_vec::<u8>()?),
            DType::Int8 => preview(&view.to_vec::<i8>()?),
            _ => String::from("(not shown)"),
        };
        println!(
            "   [{slot}] {} {} {}: {preview}",
            view.name(),
            view.dtype(),
            view.shape()
        );
    }
    Ok(())
}

fn preview<T: std::fmt::Debug>(values: &[T]) -> String {
    const SHOWN: usize = 8;
    format!(
        "{:?}{}",
        &values[..values.len().min(SHOWN)],
        if values.len() > SHOWN { " ..." } else { "" },
    )
}
