// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The single-shot harness with a type-state–enforced pipeline.
//!
//! ```text
//! Harness<R, Idle>
//!     │  .load(path)       "Load model": load, build, parallelism, allocate,
//!     ▼                    strategy.prepare(), diagnostic dump
//! Harness<R, Loaded<G>>
//!     │  .populate()       "Preprocess": validate, tokenize, write inputs
//!     ▼
//! Harness<R, Populated<G>>
//!     │  .execute()        "Inference": one forward pass
//!     ▼
//! Harness<R, Executed<G>>  outputs readable through .graph()
//! ```
//!
//! Each transition consumes the old value, so a graph cannot be executed
//! before it was populated, or populated twice.

use crate::{DiagnosticDumper, HarnessConfig, HarnessError, InputStrategy, PopulationReport, Profiler};
use runtime::{GraphInstance, Interpreter, Runtime};
use std::path::Path;

pub const PHASE_LOAD: &str = "Load model";
pub const PHASE_PREPROCESS: &str = "Preprocess";
pub const PHASE_INFERENCE: &str = "Inference";

// ── Type-state markers ─────────────────────────────────────────

/// No model loaded yet.
#[derive(Debug)]
pub struct Idle;

/// Graph built and allocated; inputs not written.
#[derive(Debug)]
pub struct Loaded<G> {
    graph: G,
}

/// Inputs written by the strategy.
#[derive(Debug)]
pub struct Populated<G> {
    graph: G,
    report: PopulationReport,
}

/// One forward pass completed.
#[derive(Debug)]
pub struct Executed<G> {
    graph: G,
    report: PopulationReport,
}

/// Run options that do not depend on the input mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarnessOptions {
    /// Advisory worker count handed to the runtime; 0 = runtime default.
    pub threads: usize,
    pub trace_enabled: bool,
}

// ── Harness ────────────────────────────────────────────────────

/// Drives one model through load, populate and execute.
pub struct Harness<R: Runtime, S = Idle> {
    runtime: R,
    strategy: Box<dyn InputStrategy>,
    options: HarnessOptions,
    dumper: DiagnosticDumper,
    profiler: Profiler,
    state: S,
}

impl<R: Runtime, S> Harness<R, S> {
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    pub fn options(&self) -> HarnessOptions {
        self.options
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    fn advance<T>(self, state: T) -> Harness<R, T> {
        Harness {
            runtime: self.runtime,
            strategy: self.strategy,
            options: self.options,
            dumper: self.dumper,
            profiler: self.profiler,
            state,
        }
    }

    fn into_parts(self) -> (Harness<R, ()>, S) {
        let Harness {
            runtime,
            strategy,
            options,
            dumper,
            profiler,
            state,
        } = self;
        let harness = Harness {
            runtime,
            strategy,
            options,
            dumper,
            profiler,
            state: (),
        };
        (harness, state)
    }
}

impl Harness<Interpreter, Idle> {
    /// Builds a harness over the reference interpreter from a configuration.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        let runtime = Interpreter::new().with_arena_budget(config.parse_budget()?);
        let options = HarnessOptions {
            threads: config.resolve_threads(),
            trace_enabled: config.trace_enabled,
        };
        Ok(Harness::new(runtime, config.create_strategy()?, options))
    }
}

// ── Idle → Loaded ──────────────────────────────────────────────

impl<R: Runtime> Harness<R, Idle> {
    pub fn new(runtime: R, strategy: Box<dyn InputStrategy>, options: HarnessOptions) -> Self {
        tracing::debug!(strategy = strategy.name(), threads = options.threads, "harness created");
        Self {
            runtime,
            strategy,
            options,
            dumper: DiagnosticDumper::new(options.trace_enabled),
            profiler: Profiler::new(),
            state: Idle,
        }
    }

    /// Replaces the default stderr profiler.
    pub fn with_profiler(mut self, profiler: Profiler) -> Self {
        self.profiler = profiler;
        self
    }

    /// Loads the model and prepares the graph for population.
    ///
    /// Steps:
    /// 1. Load and integrity-check the model file.
    /// 2. Build the graph instance (resolve every operator).
    /// 3. Apply the parallelism hint and allocate every slot.
    /// 4. Prepare the strategy (tokenizer initialisation).
    /// 5. Dump diagnostics, if enabled.
    pub fn load(mut self, path: &Path) -> Result<Harness<R, Loaded<R::Graph>>, HarnessError> {
        let graph = {
            let _phase = self.profiler.phase(PHASE_LOAD);
            tracing::info!(model = %path.display(), "loading model");

            let model = self.runtime.load(path).map_err(HarnessError::ModelLoad)?;
            let mut graph = self.runtime.build(model).map_err(HarnessError::GraphBuild)?;
            graph
                .set_parallelism(self.options.threads)
                .map_err(HarnessError::GraphBuild)?;
            graph.allocate().map_err(HarnessError::GraphBuild)?;
            tracing::info!(
                tensors = graph.tensors_len(),
                nodes = graph.nodes_len(),
                inputs = graph.inputs().len(),
                outputs = graph.outputs().len(),
                "graph ready"
            );

            self.strategy.prepare()?;
            if let Err(e) = self.dumper.dump_to_stderr(&graph) {
                tracing::warn!("diagnostic dump failed: {e}");
            }
            graph
        };
        Ok(self.advance(Loaded { graph }))
    }

    /// Runs all three phases.
    pub fn run(self, path: &Path) -> Result<Harness<R, Executed<R::Graph>>, HarnessError> {
        self.load(path)?.populate()?.execute()
    }
}

// ── Loaded → Populated ─────────────────────────────────────────

impl<R: Runtime> Harness<R, Loaded<R::Graph>> {
    pub fn graph(&self) -> &R::Graph {
        &self.state.graph
    }

    /// Writes the diagnostic dump to `out` regardless of `trace_enabled`.
    pub fn dump(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        DiagnosticDumper::new(true).dump(&self.state.graph, out)
    }

    /// Validates the graph's inputs against the strategy and writes them.
    pub fn populate(self) -> Result<Harness<R, Populated<R::Graph>>, HarnessError> {
        let (mut harness, Loaded { mut graph }) = self.into_parts();
        let report = {
            let _phase = harness.profiler.phase(PHASE_PREPROCESS);
            let report = harness.strategy.populate(&mut graph)?;
            tracing::info!("{}", report.summary());
            report
        };
        Ok(harness.advance(Populated { graph, report }))
    }
}

// ── Populated → Executed ───────────────────────────────────────

impl<R: Runtime> Harness<R, Populated<R::Graph>> {
    pub fn graph(&self) -> &R::Graph {
        &self.state.graph
    }

    pub fn report(&self) -> &PopulationReport {
        &self.state.report
    }

    /// Runs one forward pass.
    pub fn execute(self) -> Result<Harness<R, Executed<R::Graph>>, HarnessError> {
        let (harness, Populated { mut graph, report }) = self.into_parts();
        {
            let _phase = harness.profiler.phase(PHASE_INFERENCE);
            graph.execute().map_err(HarnessError::Execution)?;
        }
        tracing::info!(outputs = graph.outputs().len(), "inference complete");
        Ok(harness.advance(Executed { graph, report }))
    }
}

// ── Executed ───────────────────────────────────────────────────

impl<R: Runtime> Harness<R, Executed<R::Graph>> {
    /// The graph, with outputs readable through [`GraphInstance::tensor`].
    pub fn graph(&self) -> &R::Graph {
        &self.state.graph
    }

    pub fn report(&self) -> &PopulationReport {
        &self.state.report
    }

    pub fn into_graph(self) -> R::Graph {
        self.state.graph
    }
}

impl<R: Runtime, S: std::fmt::Debug> std::fmt::Debug for Harness<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("strategy", &self.strategy.name())
            .field("options", &self.options)
            .field("state", &self.state)
            .finish()
    }
}
