// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `edge-infer synthetic`: probe a model with the counting sequence.

use crate::GlobalArgs;
use harness::HarnessConfig;
use std::path::PathBuf;

pub fn execute(model: PathBuf, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut config = HarnessConfig::synthetic(model);
    super::apply_overrides(&mut config, global);
    eprintln!("Model path: `{}`", config.model_path.display());
    super::run_config(&config)
}
