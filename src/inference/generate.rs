// generate.rs — Autoregressive translation as an explicit, bounded state machine.
//
//   Encoding ──► Decoding { step } ──► Completed { truncated }
//        │               │
//        └───────────────┴──► Aborted(reason)
//
// Decoding is greedy and batched. All rows of one generation have the same source
// length (the Marian encoder takes no padding mask), so callers group rows by length.
// A row that has emitted EOS is fed the pad token until the whole group is done or
// the step bound is hit.

use candle_core::{Device, Tensor};
use candle_transformers::models::marian::MTModel;

use crate::error::{Error, Result};
use crate::inference::executor;
use crate::inference::language::strip_control_tokens;
use crate::inference::tokenize::Batch;
use crate::models::entry::{DecoderIds, TranslationModel};
use crate::options::TranslateOptions;

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationState {
    Encoding,
    Decoding { step: usize },
    Completed { truncated: bool },
    Aborted(String),
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Completed { .. } | GenerationState::Aborted(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    /// Generated ids per row, without the start token and without EOS.
    pub tokens: Vec<Vec<u32>>,
    /// At least one row was still open when the step bound was reached.
    pub truncated: bool,
}

/// One batched generation over rows of equal source length.
pub struct Generation<'m> {
    model: &'m mut MTModel,
    device: Device,
    ids: DecoderIds,
    source: Tensor,
    max_steps: usize,
    state: GenerationState,
    encoder_out: Option<Tensor>,
    pad_bias: Option<Tensor>,
    outputs: Vec<Vec<u32>>,
    finished: Vec<bool>,
    /// Tokens for the next step, not yet in the KV cache.
    pending: Vec<u32>,
    past_len: usize,
}

impl<'m> Generation<'m> {
    pub fn new(model: &'m mut MTModel, device: &Device, ids: DecoderIds, batch: &Batch, max_steps: usize) -> Result<Self> {
        if batch.is_empty() {
            return Err(Error::InvalidArgument("generation needs at least one row".into()));
        }
        let rows = batch.len();
        Ok(Self {
            source: batch.ids_tensor(device)?,
            model,
            device: device.clone(),
            ids,
            max_steps: max_steps.max(1),
            state: GenerationState::Encoding,
            encoder_out: None,
            pad_bias: None,
            outputs: vec![Vec::new(); rows],
            finished: vec![false; rows],
            pending: vec![ids.decoder_start_token_id; rows],
            past_len: 0,
        })
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// Drive the machine to a terminal state.
    pub fn run(mut self) -> Result<GenerationOutput> {
        self.model.reset_kv_cache();
        let result = loop {
            match self.state {
                GenerationState::Completed { truncated } => break Ok(truncated),
                GenerationState::Aborted(_) => break Err(self.aborted()),
                _ => {
                    if let Err(e) = self.advance() {
                        self.state = GenerationState::Aborted(e.to_string());
                        break Err(e);
                    }
                }
            }
        };
        self.model.reset_kv_cache();

        let truncated = result?;
        Ok(GenerationOutput {
            tokens: self.outputs,
            truncated,
        })
    }

    /// One transition. A no-op once `Completed`.
    pub fn advance(&mut self) -> Result<()> {
        match self.state {
            GenerationState::Encoding => {
                self.encoder_out = Some(executor::encode(self.model, &self.source)?);
                self.state = GenerationState::Decoding { step: 0 };
            }
            GenerationState::Decoding { step } => {
                let Some(encoder_out) = &self.encoder_out else {
                    return Err(Error::Internal("decoder ran before encoder".into()));
                };

                let input = Tensor::from_vec(self.pending.clone(), (self.pending.len(), 1), &self.device)?;
                let logits = executor::decode_step(self.model, &input, encoder_out, self.past_len)?;
                let bias = match self.pad_bias.take() {
                    Some(bias) => bias,
                    None => pad_bias(self.ids.pad_token_id, logits.dim(1)?, &self.device)?,
                };
                let next = executor::greedy_tokens(&logits.broadcast_add(&bias)?)?;
                self.pad_bias = Some(bias);
                self.past_len += 1;

                for (row, &token) in next.iter().enumerate() {
                    if self.finished[row] {
                        self.pending[row] = self.ids.pad_token_id;
                    } else if token == self.ids.eos_token_id || token == self.ids.forced_eos_token_id {
                        self.finished[row] = true;
                        self.pending[row] = self.ids.pad_token_id;
                    } else {
                        self.outputs[row].push(token);
                        self.pending[row] = token;
                    }
                }

                let step = step + 1;
                self.state = if self.finished.iter().all(|&f| f) {
                    GenerationState::Completed { truncated: false }
                } else if step >= self.max_steps {
                    GenerationState::Completed { truncated: true }
                } else {
                    GenerationState::Decoding { step }
                };
            }
            GenerationState::Completed { .. } => {}
            GenerationState::Aborted(_) => return Err(self.aborted()),
        }
        Ok(())
    }

    fn aborted(&self) -> Error {
        let reason = match &self.state {
            GenerationState::Aborted(reason) => reason.as_str(),
            _ => "unknown",
        };
        Error::from(candle_core::Error::Msg(format!("generation aborted: {reason}")))
    }
}

// [1, vocab] with -inf at the pad id, 0 elsewhere.
fn pad_bias(pad_id: u32, vocab: usize, device: &Device) -> Result<Tensor> {
    let mut bias = vec![0f32; vocab];
    if let Some(b) = bias.get_mut(pad_id as usize) {
        *b = f32::NEG_INFINITY;
    }
    Ok(Tensor::from_vec(bias, (1, vocab), device)?)
}

/// Translate non-null rows with one model. Output order matches `texts`.
///
/// Rows are grouped by source length, then split into at most `max_rows` per
/// generation. The model stays locked for the whole call.
pub fn translate_rows(
    model: &TranslationModel,
    repo: &str,
    texts: &[&str],
    opts: &TranslateOptions,
    default_max_new_tokens: usize,
    max_rows: usize,
) -> Result<Vec<String>> {
    let prefix = model
        .languages
        .prefix_for(&opts.target_language, opts.source_language.as_deref(), repo)?;
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let batch = model
        .source
        .encode_framed(texts, &prefix, Some(model.ids.eos_token_id), opts.overflow)?;
    let max_steps = opts
        .max_new_tokens
        .unwrap_or(default_max_new_tokens)
        .min(model.ids.max_position_embeddings);

    let mut out = vec![String::new(); texts.len()];
    let mut truncated_rows = 0usize;

    let mut guard = model.lock_model();
    for group in batch.group_by_length() {
        for chunk in group.chunks(max_rows) {
            log::debug!(
                "Translating {} rows of {} tokens into {:?} (max {} steps)",
                chunk.len(),
                chunk.seq_len(),
                opts.target_language,
                max_steps
            );
            let output = Generation::new(&mut guard, &model.device, model.ids, &chunk, max_steps)?.run()?;
            if output.truncated {
                truncated_rows += chunk.len();
            }
            for (i, &row) in chunk.row_indices().iter().enumerate() {
                out[row] = strip_control_tokens(&model.target.decode(&output.tokens[i])?);
            }
        }
    }
    drop(guard);

    if truncated_rows > 0 {
        log::warn!(
            "{}: generation hit the {}-token bound in a batch of {} rows; output may be cut short",
            repo,
            max_steps,
            truncated_rows
        );
    }
    Ok(out)
}
