// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `edge-infer text` and `edge-infer text-file`: tokenize and infer.

use crate::{GlobalArgs, TokenizerArgs};
use harness::HarnessConfig;
use std::path::PathBuf;

/// Where the input text comes from.
pub enum Source {
    Literal(String),
    File(PathBuf),
}

pub fn execute(
    model: PathBuf,
    vocab: PathBuf,
    source: Source,
    tokenizer: TokenizerArgs,
    global: &GlobalArgs,
) -> anyhow::Result<()> {
    let mut config = HarnessConfig::text(model, vocab, String::new());
    match source {
        Source::Literal(text) => config.text = Some(text),
        Source::File(path) => {
            config.text = None;
            config.text_file = Some(path);
        }
    }
    config.lowercase = !tokenizer.keep_case;
    config.strip_accents = !tokenizer.keep_accents;
    super::apply_overrides(&mut config, global);

    eprintln!("Model path: `{}`", config.model_path.display());
    super::run_config(&config)
}
