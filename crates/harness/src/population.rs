// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Input population strategies.
//!
//! | Strategy | Validates | Writes |
//! |---|---|---|
//! | [`TextInput`] | three int64 `[1, L]` inputs | token ids, segment ids, mask |
//! | [`SyntheticInput`] | first input is an integer slot | `1, 2, …, N` |
//!
//! Every strategy validates the graph before it touches the tokenizer or
//! any slot.

use crate::contract::{validate_synthetic, validate_text};
use crate::{HarnessError, Tokenizer, TokenizerError};
use runtime::GraphInstance;

/// One slot written by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotWrite {
    pub slot: usize,
    pub name: String,
    pub elements: usize,
}

/// What a strategy wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationReport {
    pub strategy: &'static str,
    pub slots: Vec<SlotWrite>,
}

impl PopulationReport {
    pub fn summary(&self) -> String {
        let slots: Vec<String> = self
            .slots
            .iter()
            .map(|s| format!("{}[{}]={}", s.name, s.slot, s.elements))
            .collect();
        format!("{} input: {}", self.strategy, slots.join(", "))
    }
}

/// Maps an external input onto a graph's input slots.
pub trait InputStrategy {
    /// Short label used in logs and reports.
    fn name(&self) -> &'static str;

    /// Acquires what the strategy needs before population, such as a
    /// tokenizer vocabulary. Called during model loading.
    fn prepare(&mut self) -> Result<(), HarnessError> {
        Ok(())
    }

    /// Validates the graph's inputs, then writes them.
    fn populate(&mut self, graph: &mut dyn GraphInstance) -> Result<PopulationReport, HarnessError>;
}

type TokenizerInit<T> = Box<dyn FnOnce() -> Result<T, TokenizerError>>;

/// Tokenizes a text into the three text-model input slots.
pub struct TextInput<T> {
    text: String,
    init: Option<TokenizerInit<T>>,
    tokenizer: Option<T>,
}

impl<T: Tokenizer> TextInput<T> {
    /// Uses an already initialised tokenizer.
    pub fn new(text: impl Into<String>, tokenizer: T) -> Self {
        Self {
            text: text.into(),
            init: None,
            tokenizer: Some(tokenizer),
        }
    }

    /// Defers tokenizer construction to [`InputStrategy::prepare`].
    pub fn deferred<F>(text: impl Into<String>, init: F) -> Self
    where
        F: FnOnce() -> Result<T, TokenizerError> + 'static,
    {
        Self {
            text: text.into(),
            init: Some(Box::new(init)),
            tokenizer: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokenizer(&self) -> Option<&T> {
        self.tokenizer.as_ref()
    }
}

impl<T: Tokenizer> InputStrategy for TextInput<T> {
    fn name(&self) -> &'static str {
        "text"
    }

    fn prepare(&mut self) -> Result<(), HarnessError> {
        if let Some(init) = self.init.take() {
            self.tokenizer = Some(init().map_err(HarnessError::TokenizerInit)?);
        }
        Ok(())
    }

    fn populate(&mut self, graph: &mut dyn GraphInstance) -> Result<PopulationReport, HarnessError> {
        let binding = validate_text(&*graph)?;
        self.prepare()?;
        let tokenizer = self
            .tokenizer
            .as_mut()
            .ok_or(HarnessError::TokenizerInit(TokenizerError::Uninitialized))?;
        let triple = tokenizer
            .process(&self.text, binding.seq_len())
            .map_err(HarnessError::TokenizerProcess)?;
        binding.write(graph, &triple)?;

        let real_tokens = triple.mask.iter().filter(|&&m| m != 0).count();
        tracing::info!(
            seq_len = binding.seq_len(),
            real_tokens,
            "text input populated"
        );
        let names = ["token ids", "segment ids", "attention mask"];
        Ok(PopulationReport {
            strategy: self.name(),
            slots: binding
                .slots()
                .into_iter()
                .zip(names)
                .map(|(slot, name)| SlotWrite {
                    slot,
                    name: name.to_string(),
                    elements: binding.seq_len(),
                })
                .collect(),
        })
    }
}

impl<T> std::fmt::Debug for TextInput<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextInput")
            .field("text", &self.text)
            .field("deferred", &self.init.is_some())
            .field("ready", &self.tokenizer.is_some())
            .finish()
    }
}

/// Writes the counting sequence `1..=N` into the first input slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticInput;

impl SyntheticInput {
    pub fn new() -> Self {
        Self
    }
}

impl InputStrategy for SyntheticInput {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn populate(&mut self, graph: &mut dyn GraphInstance) -> Result<PopulationReport, HarnessError> {
        let binding = validate_synthetic(&*graph)?;
        binding.write(graph)?;

        let name = graph
            .tensor(binding.slot())
            .map(|view| view.name().to_string())
            .unwrap_or_default();
        tracing::info!(
            slot = binding.slot(),
            dtype = %binding.dtype(),
            count = binding.count(),
            "synthetic input populated"
        );
        Ok(PopulationReport {
            strategy: self.name(),
            slots: vec![SlotWrite {
                slot: binding.slot(),
                name,
                elements: binding.count(),
            }],
        })
    }
}
