// column.rs — Null-aware mapping of a text column onto a batched computation.
//
// Nulls are routed around the model: only the non-null rows are handed to the inner
// computation, in their original relative order, and the results are scattered back.
// A chunk with no non-null rows never calls it.

use crate::error::{Error, Result};

/// Apply `f` to the non-null rows of `column`. `out[i]` is `None` iff `column[i]` is.
///
/// `f` must return exactly one result per row it is given.
pub fn compute_column<T, F>(column: &[Option<&str>], f: F) -> Result<Vec<Option<T>>>
where
    F: FnOnce(&[&str]) -> Result<Vec<T>>,
{
    let (indices, texts): (Vec<usize>, Vec<&str>) = column
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|text| (i, text)))
        .unzip();

    let mut out: Vec<Option<T>> = std::iter::repeat_with(|| None).take(column.len()).collect();
    if texts.is_empty() {
        return Ok(out);
    }

    let results = f(&texts)?;
    if results.len() != texts.len() {
        return Err(Error::Internal(format!(
            "{} results for {} rows",
            results.len(),
            texts.len()
        )));
    }

    for (i, value) in indices.into_iter().zip(results) {
        out[i] = Some(value);
    }
    Ok(out)
}

/// Fixed-width list column of f32 vectors with a validity bitmap.
///
/// `values` holds `len * width` floats; null rows are zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingColumn {
    width: usize,
    values: Vec<f32>,
    validity: Vec<bool>,
}

impl EmbeddingColumn {
    /// Build from per-row results. Every non-null row must have the same length;
    /// that length becomes the width (0 when every row is null).
    pub fn from_rows(rows: Vec<Option<Vec<f32>>>) -> Result<Self> {
        let width = rows.iter().flatten().map(Vec::len).next().unwrap_or(0);

        let mut values = Vec::with_capacity(rows.len() * width);
        let mut validity = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            match row {
                Some(v) if v.len() == width => {
                    values.extend(v);
                    validity.push(true);
                }
                Some(v) => {
                    return Err(Error::Internal(format!(
                        "row {i} has {} values, expected {width}",
                        v.len()
                    )));
                }
                None => {
                    values.extend(std::iter::repeat(0.0).take(width));
                    validity.push(false);
                }
            }
        }
        Ok(Self { width, values, validity })
    }

    pub fn len(&self) -> usize {
        self.validity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn null_count(&self) -> usize {
        self.validity.iter().filter(|&&valid| !valid).count()
    }

    pub fn is_null(&self, i: usize) -> bool {
        !self.validity[i]
    }

    pub fn get(&self, i: usize) -> Option<&[f32]> {
        if *self.validity.get(i)? {
            Some(&self.values[i * self.width..(i + 1) * self.width])
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&[f32]>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Flat buffer, `len * width` floats.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn validity(&self) -> &[bool] {
        &self.validity
    }

    pub fn into_rows(self) -> Vec<Option<Vec<f32>>> {
        self.iter().map(|row| row.map(<[f32]>::to_vec)).collect()
    }
}
