// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `edge-infer run`: execute a TOML configuration.

use crate::GlobalArgs;
use harness::HarnessConfig;
use std::path::PathBuf;

pub fn execute(config_path: PathBuf, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut config = HarnessConfig::from_file(&config_path)?;
    super::apply_overrides(&mut config, global);
    config.validate()?;
    tracing::debug!(config = %config_path.display(), "configuration loaded");
    super::run_config(&config)
}
