// executor.rs — Batched forward passes on the device bound to a model entry.
//
// Tensors are created on the entry's own device; there is no path that moves work to
// another one. All arithmetic is f32.

use candle_core::{DType, IndexOp, Tensor, D};
use candle_transformers::models::marian::MTModel;

use crate::error::Result;
use crate::inference::pooling;
use crate::inference::tokenize::Batch;
use crate::models::entry::EmbeddingModel;
use crate::options::Pooling;

/// Encoder forward pass.
///
/// output: [rows, seq_len, hidden_size]
pub fn forward(model: &EmbeddingModel, batch: &Batch) -> Result<Tensor> {
    let ids = batch.ids_tensor(&model.device)?;
    let mask = batch.mask_tensor(&model.device)?;
    let token_type_ids = ids.zeros_like()?;
    let hidden = model.bert.forward(&ids, &token_type_ids, Some(&mask))?;
    Ok(hidden.to_dtype(DType::F32)?)
}

/// Forward, pool and optionally normalize, `max_rows` rows at a time.
/// Returns one vector per batch row, in batch order.
pub fn embed(model: &EmbeddingModel, batch: &Batch, pooling_mode: Pooling, normalize: bool, max_rows: usize) -> Result<Vec<Vec<f32>>> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(batch.len());
    for chunk in batch.chunks(max_rows) {
        log::debug!(
            "Embedding {} rows (seq_len={}) on {:?}",
            chunk.len(),
            chunk.seq_len(),
            model.device
        );
        let hidden = forward(model, &chunk)?;
        let mask = chunk.mask_tensor(&model.device)?;
        let pooled = pooling::pool(&hidden, &mask, pooling_mode)?;
        let pooled = if normalize {
            pooling::l2_normalize(&pooled)?
        } else {
            pooled
        };
        out.extend(pooled.to_vec2::<f32>()?);
    }
    Ok(out)
}

/// Marian encoder pass. `ids` is [rows, src_len] with no padding.
///
/// output: [rows, src_len, d_model]
pub fn encode(model: &mut MTModel, ids: &Tensor) -> Result<Tensor> {
    Ok(model.encoder().forward(ids, 0)?)
}

/// One decoder step. `input` holds the tokens not yet in the KV cache, `past_len`
/// the number that are.
///
/// output: next-token logits [rows, vocab]
pub fn decode_step(model: &mut MTModel, input: &Tensor, encoder_out: &Tensor, past_len: usize) -> Result<Tensor> {
    let logits = model.decode(input, encoder_out, past_len)?;
    let last = logits.dim(1)? - 1;
    Ok(logits.i((.., last, ..))?.to_dtype(DType::F32)?)
}

/// Argmax over the vocabulary, one token per row.
pub fn greedy_tokens(logits: &Tensor) -> Result<Vec<u32>> {
    Ok(logits.argmax(D::Minus1)?.to_vec1::<u32>()?)
}
