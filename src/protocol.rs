// protocol.rs — Request/response shapes of the column host.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use candle_columns::{DeviceArg, Error, Result};

#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct ResponseOk<T: Serialize> {
    pub id: String,
    pub result: T,
}

#[derive(Debug, Serialize)]
pub struct ResponseErr {
    pub id: String,
    pub error: String,
    /// Error class name, e.g. `ModelLoadError`.
    pub kind: String,
}

/// How `embedText` returns vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorEncoding {
    /// Nested arrays, `null` for null rows.
    #[default]
    Json,
    /// Base64 of the flat little-endian f32 buffer plus a validity array.
    Base64,
}

#[derive(Debug, Deserialize)]
pub struct EmbedTextParams {
    pub column: Vec<Option<String>>,
    pub kwargs: Value,
    #[serde(default)]
    pub encoding: VectorEncoding,
}

#[derive(Debug, Deserialize)]
pub struct TranslateParams {
    pub column: Vec<Option<String>>,
    pub kwargs: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvictParams {
    #[serde(alias = "model_repo")]
    pub model_repo: String,
    #[serde(default)]
    pub device: DeviceArg,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTextJson {
    pub width: usize,
    pub null_count: usize,
    pub rows: Vec<Option<Vec<f32>>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTextBase64 {
    pub width: usize,
    pub null_count: usize,
    pub validity: Vec<bool>,
    pub values: String,
}

/// Parse params or kwargs; shape errors are the caller's fault.
pub fn parse<T: DeserializeOwned>(what: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::InvalidArgument(format!("{what}: {e}")))
}

pub fn as_str_column(column: &[Option<String>]) -> Vec<Option<&str>> {
    column.iter().map(Option::as_deref).collect()
}
