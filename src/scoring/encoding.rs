//! BERT WordPiece encoding for chunk text.
//!
//! The inference backend expects the exact tensor layout the model was
//! fine-tuned with: token ids from the lowercasing `bert-base-uncased`
//! vocabulary, an attention mask of ones over real tokens, and segment ids of
//! one for real tokens and zero for padding (the fine-tuning pipeline used
//! segment id 1 throughout, so this is deliberate). Sequences are zero-padded
//! and hard-capped at 512 ids.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{Model, Tokenizer};

/// Hard cap on encoded sequence length.
pub const MAX_SEQUENCE_LEN: usize = 512;

/// One chunk encoded for the model, always exactly [`MAX_SEQUENCE_LEN`] long.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EncodedChunk {
    pub ids: Vec<u32>,
    pub mask: Vec<u8>,
    pub token_type_ids: Vec<u8>,
}

/// Vocab-file WordPiece encoder with BERT normalization and `[CLS]`/`[SEP]`
/// wrapping.
pub struct ChunkEncoder {
    tokenizer: Tokenizer,
}

impl ChunkEncoder {
    /// Builds the encoder from a plain vocabulary file (one token per line).
    ///
    /// # Errors
    /// Fails when the vocabulary cannot be read or lacks the `[CLS]`/`[SEP]`
    /// special tokens.
    pub fn from_vocab(vocab_path: &Path) -> Result<Self> {
        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(|error| anyhow!("failed to load wordpiece vocabulary: {error}"))
            .with_context(|| format!("vocab file {}", vocab_path.display()))?;

        let sep_id = wordpiece
            .token_to_id("[SEP]")
            .context("vocabulary is missing the [SEP] token")?;
        let cls_id = wordpiece
            .token_to_id("[CLS]")
            .context("vocabulary is missing the [CLS] token")?;

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::new(true, true, None, true)));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
        tokenizer.with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), sep_id),
            ("[CLS]".to_string(), cls_id),
        )));

        Ok(Self { tokenizer })
    }

    /// Encodes one chunk into the fixed-length model input layout.
    ///
    /// # Errors
    /// Fails when the underlying tokenizer rejects the input.
    pub fn encode(&self, text: &str) -> Result<EncodedChunk> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|error| anyhow!("failed to encode chunk: {error}"))?;

        let mut ids: Vec<u32> = encoding.get_ids().to_vec();
        let mut mask = vec![1u8; ids.len()];
        let mut token_type_ids = vec![1u8; ids.len()];

        if ids.len() > MAX_SEQUENCE_LEN {
            ids.truncate(MAX_SEQUENCE_LEN);
            mask.truncate(MAX_SEQUENCE_LEN);
            token_type_ids.truncate(MAX_SEQUENCE_LEN);
        } else {
            ids.resize(MAX_SEQUENCE_LEN, 0);
            mask.resize(MAX_SEQUENCE_LEN, 0);
            token_type_ids.resize(MAX_SEQUENCE_LEN, 0);
        }

        Ok(EncodedChunk {
            ids,
            mask,
            token_type_ids,
        })
    }
}

impl std::fmt::Debug for ChunkEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkEncoder").finish()
    }
}
