// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # harness
//!
//! Binds an external input to the exact tensor layout a loaded model
//! expects, then runs one forward pass.
//!
//! - [`contract`] checks a graph's declared input signature before any write
//!   and hands out binding values that gate the typed write path.
//! - [`InputStrategy`] implementations populate inputs from text
//!   ([`TextInput`] with a [`Tokenizer`]) or from a counting sequence
//!   ([`SyntheticInput`]).
//! - [`Harness`] sequences load, populate and execute as type states, timing
//!   each phase with the [`Profiler`] and optionally dumping diagnostics.
//!
//! # Example
//! ```no_run
//! use harness::{Harness, HarnessConfig};
//!
//! let config = HarnessConfig::synthetic("./models/probe.safetensors");
//! let done = Harness::from_config(&config)?.run(&config.model_path)?;
//! println!("{}", done.report().summary());
//! # Ok::<(), harness::HarnessError>(())
//! ```

pub mod contract;
mod config;
mod dump;
mod error;
mod pipeline;
mod population;
mod profiler;
mod tokenizer;

pub use config::{HarnessConfig, InputMode};
pub use contract::{ContractViolation, SyntheticBinding, TextBinding};
pub use dump::DiagnosticDumper;
pub use error::HarnessError;
pub use pipeline::{
    Executed, Harness, HarnessOptions, Idle, Loaded, Populated, PHASE_INFERENCE, PHASE_LOAD,
    PHASE_PREPROCESS,
};
pub use population::{InputStrategy, PopulationReport, SlotWrite, SyntheticInput, TextInput};
pub use profiler::{PhaseGuard, PhaseRecord, Profiler};
pub use tokenizer::{TokenSequenceTriple, Tokenizer, TokenizerError, WordPieceTokenizer};
