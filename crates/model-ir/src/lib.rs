// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! The model file format consumed by the reference interpreter.
//!
//! - [`GraphManifest`] — the JSON graph description: tensor slots, graph
//!   inputs and outputs, operator nodes.
//! - [`Model`] — an immutable, integrity-checked graph plus constant data.
//! - [`ModelLoader`] — reads (fully) and writes model files.
//! - [`ModelBuilder`] — declares models in code.
//!
//! # Supported Model Format
//! One SafeTensors file. Constant tensors are stored as SafeTensors tensors
//! keyed by slot name; the graph description is JSON in the header metadata
//! under [`GRAPH_METADATA_KEY`]. Operator names are not interpreted here.

mod builder;
mod error;
mod loader;
mod manifest;
mod model;

pub use builder::ModelBuilder;
pub use error::ModelError;
pub use loader::ModelLoader;
pub use manifest::{GraphManifest, OperatorDecl, TensorDecl, GRAPH_METADATA_KEY};
pub use model::Model;
