// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the harness.

use crate::{ContractViolation, TokenizerError};
use runtime::RuntimeError;
use std::path::PathBuf;

/// Every way a harness run can fail. Each variant is fatal.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot read '{path}'")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot load model")]
    ModelLoad(#[source] RuntimeError),

    #[error("cannot build graph")]
    GraphBuild(#[source] RuntimeError),

    #[error("input tensors rejected")]
    Contract(#[from] ContractViolation),

    #[error("cannot initialise tokenizer")]
    TokenizerInit(#[source] TokenizerError),

    #[error("cannot tokenize input")]
    TokenizerProcess(#[source] TokenizerError),

    #[error("inference failed")]
    Execution(#[source] RuntimeError),
}

impl HarnessError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            HarnessError::Config(_) | HarnessError::InputFile { .. } => 1,
            HarnessError::ModelLoad(_) => 2,
            HarnessError::GraphBuild(_) => 3,
            HarnessError::Contract(_) => 4,
            HarnessError::TokenizerInit(_) => 5,
            HarnessError::TokenizerProcess(_) => 6,
            HarnessError::Execution(_) => 7,
        }
    }

    /// Phase label used in the final diagnostic line.
    pub fn phase(&self) -> &'static str {
        match self {
            HarnessError::Config(_) | HarnessError::InputFile { .. } => "arguments",
            HarnessError::ModelLoad(_) => "model load",
            HarnessError::GraphBuild(_) => "graph build",
            HarnessError::Contract(_) => "input validation",
            HarnessError::TokenizerInit(_) => "tokenizer initialisation",
            HarnessError::TokenizerProcess(_) => "tokenization",
            HarnessError::Execution(_) => "inference",
        }
    }
}
