// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Harness configuration loaded from TOML files or built from arguments.
//!
//! # TOML Format
//! ```toml
//! model_path = "./models/bert-tiny.safetensors"
//! vocab_path = "./models/vocab.txt"
//! mode = "text"            # "text" | "synthetic"
//! text = "hello world"     # or text_file = "input.txt"
//! num_threads = 8
//! lowercase = true
//! strip_accents = true
//! trace_enabled = false
//! arena_budget = "256M"
//! ```

use crate::{HarnessError, InputStrategy, SyntheticInput, TextInput, WordPieceTokenizer};
use memory_manager::MemoryBudget;
use std::path::{Path, PathBuf};

/// Which population strategy a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Text,
    Synthetic,
}

/// Configuration for one harness run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HarnessConfig {
    /// Path to the model container.
    pub model_path: PathBuf,
    /// WordPiece vocabulary, required in text mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab_path: Option<PathBuf>,
    #[serde(default)]
    pub mode: InputMode,
    /// Literal input text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// UTF-8 file holding the input text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_file: Option<PathBuf>,
    /// Worker threads for inference (defaults to available parallelism).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_true")]
    pub strip_accents: bool,
    /// Enables the diagnostic dump after model load.
    #[serde(default)]
    pub trace_enabled: bool,
    /// Ceiling on tensor slot memory (human-readable, e.g. `"256M"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arena_budget: Option<String>,
}

fn default_true() -> bool {
    true
}

impl HarnessConfig {
    /// A text-mode configuration with defaults for everything else.
    pub fn text(model_path: impl Into<PathBuf>, vocab_path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            vocab_path: Some(vocab_path.into()),
            mode: InputMode::Text,
            text: Some(text.into()),
            text_file: None,
            num_threads: None,
            lowercase: true,
            strip_accents: true,
            trace_enabled: false,
            arena_budget: None,
        }
    }

    /// A synthetic-mode configuration.
    pub fn synthetic(model_path: impl Into<PathBuf>) -> Self {
        Self {
            mode: InputMode::Synthetic,
            vocab_path: None,
            text: None,
            ..Self::text(model_path, PathBuf::new(), String::new())
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, HarnessError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| HarnessError::Config(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, HarnessError> {
        toml::to_string_pretty(self)
            .map_err(|e| HarnessError::Config(format!("TOML serialise error: {e}")))
    }

    /// Text mode needs a vocabulary and exactly one text source; the arena
    /// budget, if present, must parse.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.mode == InputMode::Text {
            if self.vocab_path.is_none() {
                return Err(HarnessError::Config("text mode requires 'vocab_path'".into()));
            }
            if self.text.is_some() == self.text_file.is_some() {
                return Err(HarnessError::Config(
                    "text mode requires exactly one of 'text' and 'text_file'".into(),
                ));
            }
        }
        if self.num_threads == Some(0) {
            return Err(HarnessError::Config("'num_threads' must be positive".into()));
        }
        self.parse_budget()?;
        Ok(())
    }

    /// Parses the arena budget, if one is set.
    pub fn parse_budget(&self) -> Result<Option<MemoryBudget>, HarnessError> {
        self.arena_budget
            .as_deref()
            .map(MemoryBudget::parse)
            .transpose()
            .map_err(|e| HarnessError::Config(format!("invalid arena budget: {e}")))
    }

    /// Resolves the number of worker threads.
    pub fn resolve_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// The input text, read from `text_file` when set.
    pub fn load_text(&self) -> Result<String, HarnessError> {
        match (&self.text, &self.text_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|source| {
                HarnessError::InputFile {
                    path: path.clone(),
                    source,
                }
            }),
            (None, None) => Err(HarnessError::Config("no input text given".into())),
        }
    }

    /// Creates the population strategy for this configuration. The
    /// tokenizer vocabulary is opened later, during model loading.
    pub fn create_strategy(&self) -> Result<Box<dyn InputStrategy>, HarnessError> {
        match self.mode {
            InputMode::Synthetic => Ok(Box::new(SyntheticInput::new())),
            InputMode::Text => {
                let vocab = self
                    .vocab_path
                    .clone()
                    .ok_or_else(|| HarnessError::Config("text mode requires 'vocab_path'".into()))?;
                let text = self.load_text()?;
                let (lowercase, strip_accents) = (self.lowercase, self.strip_accents);
                Ok(Box::new(TextInput::deferred(text, move || {
                    WordPieceTokenizer::from_vocab(&vocab, lowercase, strip_accents)
                })))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml() {
        let toml = r#"
model_path = "/tmp/model.safetensors"
vocab_path = "/tmp/vocab.txt"
text = "hello world"
num_threads = 2
strip_accents = false
arena_budget = "64M"
"#;
        let c = HarnessConfig::from_toml(toml).unwrap();
        assert_eq!(c.mode, InputMode::Text);
        assert_eq!(c.model_path, PathBuf::from("/tmp/model.safetensors"));
        assert_eq!(c.num_threads, Some(2));
        assert!(c.lowercase);
        assert!(!c.strip_accents);
        assert!(!c.trace_enabled);
        assert_eq!(c.parse_budget().unwrap(), Some(MemoryBudget::from_mb(64)));
    }

    #[test]
    fn test_synthetic_needs_no_vocab() {
        let c = HarnessConfig::from_toml("model_path = \"m\"\nmode = \"synthetic\"\n").unwrap();
        assert_eq!(c.mode, InputMode::Synthetic);
        assert_eq!(c.create_strategy().unwrap().name(), "synthetic");
    }

    #[test]
    fn test_text_requires_vocab_and_one_source() {
        let missing_vocab = "model_path = \"m\"\ntext = \"hi\"\n";
        assert!(matches!(
            HarnessConfig::from_toml(missing_vocab),
            Err(HarnessError::Config(_))
        ));

        let both = "model_path = \"m\"\nvocab_path = \"v\"\ntext = \"hi\"\ntext_file = \"t\"\n";
        assert!(HarnessConfig::from_toml(both).is_err());

        let neither = "model_path = \"m\"\nvocab_path = \"v\"\n";
        assert!(HarnessConfig::from_toml(neither).is_err());
    }

    #[test]
    fn test_bad_budget_and_threads() {
        let mut c = HarnessConfig::synthetic("m");
        c.arena_budget = Some("lots".into());
        assert_eq!(c.validate().unwrap_err().exit_code(), 1);

        let mut c = HarnessConfig::synthetic("m");
        c.num_threads = Some(0);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let err = HarnessConfig::from_toml("model_path = \"m\"\nmode = \"audio\"\n").unwrap_err();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = HarnessConfig::text("model.safetensors", "vocab.txt", "hello world");
        let back = HarnessConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_text_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "from a file").unwrap();
        let c = HarnessConfig {
            text: None,
            text_file: Some(path),
            ..HarnessConfig::text("m", "v", "")
        };
        assert_eq!(c.load_text().unwrap(), "from a file");

        let c = HarnessConfig {
            text: None,
            text_file: Some(dir.path().join("absent.txt")),
            ..HarnessConfig::text("m", "v", "")
        };
        assert!(matches!(c.load_text(), Err(HarnessError::InputFile { .. })));
    }

    #[test]
    fn test_resolve_threads() {
        let mut c = HarnessConfig::synthetic("m");
        c.num_threads = Some(8);
        assert_eq!(c.resolve_threads(), 8);
        c.num_threads = None;
        assert!(c.resolve_threads() >= 1);
    }
}
