// tokenize.rs — Text to padded token-id batches.
//
// Padding is dynamic: every row is right-padded to the longest row of its own batch.
// Rows keep their position within the non-null subset so results can be realigned.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use crate::error::{Error, Result};
use crate::options::Overflow;

/// Token ids for an ordered set of rows, unpadded until a tensor is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    rows: Vec<usize>,
    tokens: Vec<Vec<u32>>,
    pad_id: u32,
}

impl Batch {
    pub fn new(rows: Vec<usize>, tokens: Vec<Vec<u32>>, pad_id: u32) -> Self {
        debug_assert_eq!(rows.len(), tokens.len());
        Self { rows, tokens, pad_id }
    }

    pub fn empty(pad_id: u32) -> Self {
        Self::new(Vec::new(), Vec::new(), pad_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn tokens(&self, i: usize) -> &[u32] {
        &self.tokens[i]
    }

    pub fn lengths(&self) -> Vec<usize> {
        self.tokens.iter().map(Vec::len).collect()
    }

    /// Padded width. Never zero for a non-empty batch, so an all-empty batch still
    /// produces a valid tensor made only of padding.
    pub fn seq_len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.tokens.iter().map(Vec::len).max().unwrap_or(0).max(1)
    }

    pub fn padded_ids(&self) -> Vec<u32> {
        let width = self.seq_len();
        let mut out = Vec::with_capacity(self.len() * width);
        for ids in &self.tokens {
            out.extend_from_slice(ids);
            out.extend(std::iter::repeat(self.pad_id).take(width - ids.len()));
        }
        out
    }

    /// 1 for real tokens, 0 for padding.
    pub fn attention_mask(&self) -> Vec<u32> {
        let width = self.seq_len();
        let mut out = Vec::with_capacity(self.len() * width);
        for ids in &self.tokens {
            out.extend(std::iter::repeat(1u32).take(ids.len()));
            out.extend(std::iter::repeat(0u32).take(width - ids.len()));
        }
        out
    }

    /// `[rows, seq_len]` u32 token ids on `device`.
    pub fn ids_tensor(&self, device: &Device) -> candle_core::Result<Tensor> {
        Tensor::from_vec(self.padded_ids(), (self.len(), self.seq_len()), device)
    }

    /// `[rows, seq_len]` u32 attention mask on `device`.
    pub fn mask_tensor(&self, device: &Device) -> candle_core::Result<Tensor> {
        Tensor::from_vec(self.attention_mask(), (self.len(), self.seq_len()), device)
    }

    /// Split into consecutive sub-batches of at most `max_rows`, each padded on its own.
    pub fn chunks(&self, max_rows: usize) -> Vec<Batch> {
        let max_rows = max_rows.max(1);
        self.rows
            .chunks(max_rows)
            .zip(self.tokens.chunks(max_rows))
            .map(|(rows, tokens)| Batch::new(rows.to_vec(), tokens.to_vec(), self.pad_id))
            .collect()
    }

    /// Sub-batches whose rows all have the same length, so they need no padding.
    /// Groups are ordered by length; rows inside a group keep their relative order.
    pub fn group_by_length(&self) -> Vec<Batch> {
        let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
        for (i, ids) in self.tokens.iter().enumerate() {
            match groups.iter_mut().find(|(len, _)| *len == ids.len()) {
                Some((_, members)) => members.push(i),
                None => groups.push((ids.len(), vec![i])),
            }
        }
        groups.sort_by_key(|(len, _)| *len);
        groups
            .into_iter()
            .map(|(_, members)| {
                Batch::new(
                    members.iter().map(|&i| self.rows[i]).collect(),
                    members.iter().map(|&i| self.tokens[i].clone()).collect(),
                    self.pad_id,
                )
            })
            .collect()
    }
}

/// Wraps a model tokenizer with the model's pad id and length limit.
pub struct TokenizerAdapter {
    tokenizer: Tokenizer,
    pad_id: u32,
    max_len: usize,
}

impl TokenizerAdapter {
    /// Padding and truncation configured inside the tokenizer file are switched off;
    /// the adapter does both itself. A truncation length in the file still caps `max_len`.
    pub fn new(mut tokenizer: Tokenizer, pad_id: u32, max_len: usize) -> anyhow::Result<Self> {
        let file_limit = tokenizer.get_truncation().map(|t| t.max_length);
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(None)
            .map_err(|e| anyhow::anyhow!("disable truncation: {e}"))?;

        let max_len = match file_limit {
            Some(limit) if limit > 0 => max_len.min(limit),
            _ => max_len,
        };
        anyhow::ensure!(max_len >= 2, "model sequence limit {max_len} is too small");

        Ok(Self { tokenizer, pad_id, max_len })
    }

    pub fn from_file(path: &Path, pad_id: u32, max_len: usize) -> anyhow::Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))
            .with_context(|| format!("read {}", path.display()))?;
        Self::new(tokenizer, pad_id, max_len)
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.tokenizer.token_to_id(token)
    }

    pub fn vocab(&self) -> HashMap<String, u32> {
        self.tokenizer.get_vocab(true)
    }

    /// Encode with the tokenizer's own special tokens.
    pub fn encode(&self, texts: &[&str], overflow: Overflow) -> Result<Batch> {
        self.encode_framed(texts, &[], None, overflow)
    }

    /// Encode, then put `prefix` in front of every row and make sure every row ends
    /// with `end` (appended unless the tokenizer already put it there).
    pub fn encode_framed(
        &self,
        texts: &[&str],
        prefix: &[u32],
        end: Option<u32>,
        overflow: Overflow,
    ) -> Result<Batch> {
        if texts.is_empty() {
            return Ok(Batch::empty(self.pad_id));
        }

        let encodings = self.tokenizer.encode_batch(texts.to_vec(), true)?;

        let mut tokens = Vec::with_capacity(encodings.len());
        for (row, enc) in encodings.iter().enumerate() {
            let ids = enc.get_ids();
            let special = enc.get_special_tokens_mask();

            // Split into body and the trailing marker that must survive truncation.
            let (body, tail): (&[u32], Vec<u32>) = match end {
                Some(end_id) if ids.last() == Some(&end_id) => (&ids[..ids.len() - 1], vec![end_id]),
                Some(end_id) => (ids, vec![end_id]),
                None if special.last() == Some(&1) => (&ids[..ids.len() - 1], vec![ids[ids.len() - 1]]),
                None => (ids, Vec::new()),
            };

            let total = prefix.len() + body.len() + tail.len();
            let room = self.max_len.saturating_sub(prefix.len() + tail.len());
            let body = if total > self.max_len {
                match overflow {
                    Overflow::Error => {
                        return Err(Error::Tokenization(format!(
                            "row {row} has {total} tokens; the model accepts at most {}",
                            self.max_len
                        )));
                    }
                    Overflow::Truncate => {
                        log::debug!("Truncating row {} from {} to {} tokens", row, total, self.max_len);
                        &body[..room.min(body.len())]
                    }
                }
            } else {
                body
            };

            let mut seq = Vec::with_capacity(prefix.len() + body.len() + tail.len());
            seq.extend_from_slice(prefix);
            seq.extend_from_slice(body);
            seq.extend_from_slice(&tail);
            tokens.push(seq);
        }

        Ok(Batch::new((0..texts.len()).collect(), tokens, self.pad_id))
    }

    /// Token ids back to text, without special tokens.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        Ok(self.tokenizer.decode(ids, true)?)
    }
}
