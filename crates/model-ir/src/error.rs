// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model loading and construction.

use std::path::PathBuf;

/// Errors raised while reading, checking or writing a model container.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model file could not be read or written.
    #[error("cannot access model file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a valid SafeTensors container.
    #[error("invalid SafeTensors container: {0}")]
    Container(String),

    /// The container carries no graph description.
    #[error("container has no '{key}' metadata entry")]
    MissingGraph { key: &'static str },

    /// The graph description is not well-formed JSON for the manifest schema.
    #[error("failed to parse graph description")]
    GraphParse(#[from] serde_json::Error),

    /// The graph description is internally inconsistent.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),

    /// A constant tensor is missing or disagrees with its declaration.
    #[error("constant tensor '{name}': {detail}")]
    Constant { name: String, detail: String },
}
