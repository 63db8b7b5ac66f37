// pooling.rs — Reduce per-token hidden states to one vector per row.
//
// Only attention-masked (real) positions take part. Padding never leaks into the
// result: it is multiplied out for sum/mean and replaced by -inf before max.
// A row with no real positions pools to the zero vector.

use candle_core::{DType, Tensor};

use crate::config;
use crate::options::Pooling;

/// hidden: [batch, seq_len, hidden_size]
/// attention_mask: [batch, seq_len] (1 for real tokens, 0 for padding)
/// output: [batch, hidden_size]
pub fn pool(hidden: &Tensor, attention_mask: &Tensor, pooling: Pooling) -> candle_core::Result<Tensor> {
    let hidden = hidden.to_dtype(DType::F32)?;

    // [batch, seq_len] → [batch, seq_len, 1]
    let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    // [batch, 1]
    let counts = mask.sum(1)?;

    match pooling {
        Pooling::Sum => hidden.broadcast_mul(&mask)?.sum(1),
        Pooling::Mean => {
            let sum = hidden.broadcast_mul(&mask)?.sum(1)?;
            // Empty rows have sum 0, dividing by 1 keeps them at zero.
            sum.broadcast_div(&counts.clamp(1.0, f64::MAX)?)
        }
        Pooling::Max => {
            let keep = mask.broadcast_as(hidden.shape())?.ne(0f32)?;
            let neg_inf = Tensor::full(f32::NEG_INFINITY, hidden.shape(), hidden.device())?;
            let max = keep.where_cond(&hidden, &neg_inf)?.max(1)?;

            let has_tokens = counts.gt(0f32)?.broadcast_as(max.shape())?;
            has_tokens.where_cond(&max, &max.zeros_like()?)
        }
    }
}

/// L2 normalize along the last dimension. Zero rows stay zero.
pub fn l2_normalize(pooled: &Tensor) -> candle_core::Result<Tensor> {
    let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
    let norm = norm.clamp(config::inference::NORM_EPSILON, f64::MAX)?;
    pooled.broadcast_div(&norm)
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity of two equal-length vectors; 0 if either is the zero vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let (na, nb) = (l2_norm(a), l2_norm(b));
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (na * nb)
}
