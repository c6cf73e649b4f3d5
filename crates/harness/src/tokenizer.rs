// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tokenizer capability and the WordPiece implementation.
//!
//! [`WordPieceTokenizer`] assembles a BERT pipeline from the `tokenizers`
//! crate: BERT normaliser, BERT pre-tokenizer, WordPiece over a one-token-
//! per-line vocabulary, `[CLS] … [SEP]` post-processing, truncation to `L`
//! and fixed-length padding with `[PAD]`.

use std::path::{Path, PathBuf};
use tokenizers::decoders::wordpiece::WordPiece as WordPieceDecoder;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{
    Model, PaddingParams, PaddingStrategy, PostProcessor, TokenizerBuilder, TokenizerImpl,
    TruncationParams,
};

pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";

/// Token ids, segment ids and attention mask of one text, index-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenSequenceTriple {
    pub ids: Vec<i64>,
    pub segment_ids: Vec<i64>,
    pub mask: Vec<i64>,
}

impl TokenSequenceTriple {
    /// Length of the id sequence.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Tokenizer failures.
#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    #[error("cannot load vocabulary '{path}': {detail}")]
    Vocabulary { path: PathBuf, detail: String },

    #[error("vocabulary '{path}' has no '{token}' token")]
    MissingSpecialToken { path: PathBuf, token: &'static str },

    #[error("tokenizer was not initialised")]
    Uninitialized,

    #[error("sequence length {len} cannot hold the {minimum} special tokens")]
    TooShort { len: usize, minimum: usize },

    #[error("cannot encode text: {0}")]
    Encode(String),

    #[error("tokenizer produced ids/segments/mask of length {ids}/{segments}/{mask}, expected {expected}")]
    Length {
        expected: usize,
        ids: usize,
        segments: usize,
        mask: usize,
    },
}

/// Turns text into a [`TokenSequenceTriple`] of exactly `len` elements.
///
/// Implementations own padding and truncation.
pub trait Tokenizer {
    fn process(&mut self, text: &str, len: usize) -> Result<TokenSequenceTriple, TokenizerError>;
}

type BertPipeline =
    TokenizerImpl<WordPiece, BertNormalizer, BertPreTokenizer, BertProcessing, WordPieceDecoder>;

/// BERT-style WordPiece tokenizer.
pub struct WordPieceTokenizer {
    inner: BertPipeline,
    pad_id: u32,
    /// Tokens the post-processor adds around a single sequence.
    special_tokens: usize,
    configured_len: Option<usize>,
}

impl WordPieceTokenizer {
    /// Loads a vocabulary file and builds the pipeline.
    ///
    /// The vocabulary must contain `[CLS]`, `[SEP]`, `[PAD]` and `[UNK]`.
    pub fn from_vocab(
        path: &Path,
        lowercase: bool,
        strip_accents: bool,
    ) -> Result<Self, TokenizerError> {
        let vocab_err = |detail: String| TokenizerError::Vocabulary {
            path: path.to_path_buf(),
            detail,
        };
        let path_str = path
            .to_str()
            .ok_or_else(|| vocab_err("path is not valid UTF-8".into()))?;
        let model = WordPiece::from_file(path_str)
            .unk_token(UNK_TOKEN.to_string())
            .build()
            .map_err(|e| vocab_err(e.to_string()))?;

        let id_of = |token: &'static str| {
            model
                .token_to_id(token)
                .ok_or_else(|| TokenizerError::MissingSpecialToken {
                    path: path.to_path_buf(),
                    token,
                })
        };
        let cls = id_of(CLS_TOKEN)?;
        let sep = id_of(SEP_TOKEN)?;
        let pad_id = id_of(PAD_TOKEN)?;
        id_of(UNK_TOKEN)?;
        let vocab_size = model.get_vocab_size();

        let inner = TokenizerBuilder::new()
            .with_model(model)
            .with_normalizer(Some(BertNormalizer::new(
                true,
                true,
                Some(strip_accents),
                lowercase,
            )))
            .with_pre_tokenizer(Some(BertPreTokenizer))
            .with_post_processor(Some(BertProcessing::new(
                (SEP_TOKEN.to_string(), sep),
                (CLS_TOKEN.to_string(), cls),
            )))
            .with_decoder(None)
            .build()
            .map_err(|e| vocab_err(e.to_string()))?;
        let special_tokens = inner
            .get_post_processor()
            .map_or(0, |p| p.added_tokens(false));

        tracing::info!(
            vocab = %path.display(),
            vocab_size,
            lowercase,
            strip_accents,
            "wordpiece tokenizer ready"
        );
        Ok(Self {
            inner,
            pad_id,
            special_tokens,
            configured_len: None,
        })
    }

    fn configure(&mut self, len: usize) -> Result<(), TokenizerError> {
        if self.configured_len == Some(len) {
            return Ok(());
        }
        self.inner
            .with_truncation(Some(TruncationParams {
                max_length: len,
                ..Default::default()
            }))
            .map_err(|e| TokenizerError::Encode(e.to_string()))?;
        self.inner.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(len),
            pad_id: self.pad_id,
            pad_type_id: 0,
            pad_token: PAD_TOKEN.to_string(),
            ..Default::default()
        }));
        self.configured_len = Some(len);
        Ok(())
    }
}

impl Tokenizer for WordPieceTokenizer {
    fn process(&mut self, text: &str, len: usize) -> Result<TokenSequenceTriple, TokenizerError> {
        // Truncation cannot make room for [CLS]/[SEP] below this length.
        let minimum = self.special_tokens.max(1);
        if len < minimum {
            return Err(TokenizerError::TooShort { len, minimum });
        }
        self.configure(len)?;
        let encoding = self
            .inner
            .encode(text, true)
            .map_err(|e| TokenizerError::Encode(e.to_string()))?;

        if !encoding.get_overflowing().is_empty() {
            tracing::warn!(len, "input text truncated to the model's sequence length");
        }
        let widen = |values: &[u32]| values.iter().map(|&v| i64::from(v)).collect::<Vec<_>>();
        Ok(TokenSequenceTriple {
            ids: widen(encoding.get_ids()),
            segment_ids: widen(encoding.get_type_ids()),
            mask: widen(encoding.get_attention_mask()),
        })
    }
}

impl std::fmt::Debug for WordPieceTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordPieceTokenizer")
            .field("vocab_size", &self.inner.get_model().get_vocab_size())
            .field("pad_id", &self.pad_id)
            .field("configured_len", &self.configured_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vocab(tokens: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for t in tokens {
            writeln!(file, "{t}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn basic_vocab() -> tempfile::NamedTempFile {
        vocab(&["[PAD]", "[UNK]", "[CLS]", "[SEP]", "hello", "world", "##s"])
    }

    #[test]
    fn test_pads_short_text() {
        let file = basic_vocab();
        let mut t = WordPieceTokenizer::from_vocab(file.path(), true, true).unwrap();
        let triple = t.process("hello world", 8).unwrap();
        assert_eq!(triple.ids, vec![2, 4, 5, 3, 0, 0, 0, 0]);
        assert_eq!(triple.segment_ids, vec![0; 8]);
        assert_eq!(triple.mask, vec![1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_lowercases_and_splits_subwords() {
        let file = basic_vocab();
        let mut t = WordPieceTokenizer::from_vocab(file.path(), true, true).unwrap();
        let triple = t.process("Hello Worlds", 6).unwrap();
        assert_eq!(triple.ids, vec![2, 4, 5, 6, 3, 0]);
    }

    #[test]
    fn test_unknown_word_maps_to_unk() {
        let file = basic_vocab();
        let mut t = WordPieceTokenizer::from_vocab(file.path(), true, true).unwrap();
        let triple = t.process("hello there", 5).unwrap();
        assert_eq!(triple.ids, vec![2, 4, 1, 3, 0]);
    }

    #[test]
    fn test_truncates_long_text() {
        let file = basic_vocab();
        let mut t = WordPieceTokenizer::from_vocab(file.path(), true, true).unwrap();
        let triple = t.process("hello world hello world hello world", 4).unwrap();
        assert_eq!(triple.len(), 4);
        assert_eq!(triple.ids, vec![2, 4, 5, 3]);
        assert_eq!(triple.mask, vec![1; 4]);
    }

    #[test]
    fn test_length_can_change_between_calls() {
        let file = basic_vocab();
        let mut t = WordPieceTokenizer::from_vocab(file.path(), true, true).unwrap();
        assert_eq!(t.process("hello", 4).unwrap().len(), 4);
        assert_eq!(t.process("hello", 10).unwrap().len(), 10);
    }

    #[test]
    fn test_missing_vocab_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = WordPieceTokenizer::from_vocab(&dir.path().join("vocab.txt"), true, true)
            .unwrap_err();
        assert!(matches!(err, TokenizerError::Vocabulary { .. }));
    }

    #[test]
    fn test_missing_special_token() {
        let file = vocab(&["[PAD]", "[UNK]", "[CLS]", "hello"]);
        let err = WordPieceTokenizer::from_vocab(file.path(), true, true).unwrap_err();
        assert!(matches!(err, TokenizerError::MissingSpecialToken { token: "[SEP]", .. }));
    }

    #[test]
    fn test_length_below_special_tokens_rejected() {
        let file = basic_vocab();
        let mut t = WordPieceTokenizer::from_vocab(file.path(), true, true).unwrap();
        for len in [0, 1] {
            assert!(matches!(
                t.process("hello world", len),
                Err(TokenizerError::TooShort { minimum: 2, .. })
            ));
        }
    }

    #[test]
    fn test_shortest_lengths_keep_special_tokens() {
        let file = basic_vocab();
        let mut t = WordPieceTokenizer::from_vocab(file.path(), true, true).unwrap();
        assert_eq!(t.process("hello world", 2).unwrap().ids, vec![2, 3]);
        assert_eq!(t.process("hello world", 3).unwrap().ids, vec![2, 4, 3]);
    }
}
