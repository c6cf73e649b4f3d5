// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # edge-infer
//!
//! Command-line interface for the single-shot inference harness.
//!
//! ## Usage
//! ```bash
//! # Tokenize a text and run one forward pass
//! edge-infer text ./models/bert-tiny.safetensors ./models/vocab.txt "hello world"
//!
//! # Same, reading the text from a file
//! edge-infer text-file ./models/bert-tiny.safetensors ./models/vocab.txt input.txt
//!
//! # Probe a model with the counting sequence 1..N
//! edge-infer synthetic ./models/probe.safetensors
//!
//! # Print every tensor slot and the interpreter state
//! edge-infer inspect ./models/bert-tiny.safetensors
//!
//! # Run from a TOML configuration
//! edge-infer run harness.toml
//! ```
//!
//! Set `EDGE_INFER_TRACE_MODEL=1` to dump diagnostics after model load.
//! Exit status: 0 success, 1 arguments/configuration, 2 model load,
//! 3 graph build, 4 input contract, 5 tokenizer init, 6 tokenization,
//! 7 inference.

mod commands;

use clap::{Args, Parser, Subcommand};
use harness::HarnessError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "edge-infer",
    about = "Single-shot inference harness for edge models",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand; they override configuration files.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Worker threads for inference (default: available parallelism).
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: Option<u16>,

    /// Ceiling on tensor slot memory (e.g. "256M", "1G").
    #[arg(long, global = true)]
    pub arena_budget: Option<String>,
}

/// Tokenizer options of the text subcommands.
#[derive(Args, Debug, Clone)]
pub struct TokenizerArgs {
    /// Keep letter case instead of lowercasing.
    #[arg(long)]
    pub keep_case: bool,

    /// Keep accents instead of stripping them.
    #[arg(long)]
    pub keep_accents: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize a literal text into the model's three input slots and run it.
    Text {
        /// Path to the model container.
        model: PathBuf,
        /// Path to the WordPiece vocabulary.
        vocab: PathBuf,
        /// Input text.
        text: String,
        #[command(flatten)]
        tokenizer: TokenizerArgs,
    },

    /// Like `text`, reading the input from a UTF-8 file.
    TextFile {
        /// Path to the model container.
        model: PathBuf,
        /// Path to the WordPiece vocabulary.
        vocab: PathBuf,
        /// File holding the input text.
        file: PathBuf,
        #[command(flatten)]
        tokenizer: TokenizerArgs,
    },

    /// Fill the first input slot with 1, 2, …, N and run the model.
    Synthetic {
        /// Path to the model container.
        model: PathBuf,
    },

    /// Load and build a model, then print every slot and the interpreter state.
    Inspect {
        /// Path to the model container.
        model: PathBuf,
    },

    /// Run from a TOML configuration file.
    Run {
        /// Path to the configuration file.
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout with status 0; usage errors to
            // stderr with status 1.
            let code = u8::from(e.use_stderr());
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    commands::init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Text {
            model,
            vocab,
            text,
            tokenizer,
        } => commands::text::execute(model, vocab, commands::text::Source::Literal(text), tokenizer, &cli.global),
        Commands::TextFile {
            model,
            vocab,
            file,
            tokenizer,
        } => commands::text::execute(model, vocab, commands::text::Source::File(file), tokenizer, &cli.global),
        Commands::Synthetic { model } => commands::synthetic::execute(model, &cli.global),
        Commands::Inspect { model } => commands::inspect::execute(model, &cli.global),
        Commands::Run { config } => commands::run::execute(config, &cli.global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let harness_error = e.chain().find_map(|c| c.downcast_ref::<HarnessError>());
            match harness_error {
                Some(h) => {
                    eprintln!("error: {} failed: {e:#}", h.phase());
                    ExitCode::from(h.exit_code())
                }
                None => {
                    eprintln!("error: {e:#}");
                    ExitCode::from(1)
                }
            }
        }
    }
}
