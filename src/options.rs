// options.rs — Keyword arguments as received from the host, and the closed option
// structs the core works with.
//
// Kwargs arrive as loosely typed JSON. They are validated once, here, and everything
// past this module only sees `EmbedOptions` / `TranslateOptions`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceArg {
    #[default]
    Cpu,
    Gpu,
}

impl fmt::Display for DeviceArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceArg::Cpu => f.write_str("cpu"),
            DeviceArg::Gpu => f.write_str("gpu"),
        }
    }
}

/// How per-token hidden states are reduced to one vector per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    Max,
    Sum,
    #[default]
    Mean,
}

/// What to do with rows longer than the model can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Truncate,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedOptions {
    pub pooling: Pooling,
    pub normalize: bool,
    pub device: DeviceArg,
    pub overflow: Overflow,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            pooling: Pooling::Mean,
            normalize: false,
            device: DeviceArg::Cpu,
            overflow: Overflow::Truncate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslateOptions {
    pub target_language: String,
    pub source_language: Option<String>,
    pub device: DeviceArg,
    /// Generation bound; `None` uses the engine default.
    pub max_new_tokens: Option<usize>,
    pub overflow: Overflow,
}

impl TranslateOptions {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            source_language: None,
            device: DeviceArg::Cpu,
            max_new_tokens: None,
            overflow: Overflow::Truncate,
        }
    }
}

/// `embed_text` keyword arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingKwargs {
    /// Model repository name, or a local directory.
    pub model_repo: String,

    #[serde(default)]
    pub pooling: Pooling,

    #[serde(default)]
    pub normalize: bool,

    #[serde(default)]
    pub device: DeviceArg,

    #[serde(default)]
    pub overflow: Overflow,
}

impl EmbeddingKwargs {
    /// Validate and split into the repository name and the closed option set.
    pub fn into_options(self) -> Result<(String, EmbedOptions)> {
        let repo = validate_repo(self.model_repo)?;
        Ok((
            repo,
            EmbedOptions {
                pooling: self.pooling,
                normalize: self.normalize,
                device: self.device,
                overflow: self.overflow,
            },
        ))
    }
}

/// `translate` keyword arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslateKwargs {
    pub model_repo: String,

    /// What language to translate to.
    pub to_language: String,

    /// What language to translate from. Left to the model when absent.
    #[serde(default)]
    pub from_language: Option<String>,

    #[serde(default)]
    pub device: DeviceArg,

    #[serde(default)]
    pub max_new_tokens: Option<usize>,

    #[serde(default)]
    pub overflow: Overflow,
}

impl TranslateKwargs {
    pub fn into_options(self) -> Result<(String, TranslateOptions)> {
        let repo = validate_repo(self.model_repo)?;
        let target_language = validate_language(&self.to_language)?;
        let source_language = self
            .from_language
            .as_deref()
            .map(validate_language)
            .transpose()?;
        if self.max_new_tokens == Some(0) {
            return Err(Error::InvalidArgument("max_new_tokens must be at least 1".into()));
        }
        Ok((
            repo,
            TranslateOptions {
                target_language,
                source_language,
                device: self.device,
                max_new_tokens: self.max_new_tokens,
                overflow: self.overflow,
            },
        ))
    }
}

fn validate_repo(repo: String) -> Result<String> {
    let repo = repo.trim().to_string();
    if repo.is_empty() {
        return Err(Error::InvalidArgument("model_repo must not be empty".into()));
    }
    Ok(repo)
}

/// Language codes are short ASCII tags like `de`, `fra`, `zh_Hant` or `pt-BR`.
fn validate_language(code: &str) -> Result<String> {
    let code = code.trim();
    let ok = !code.is_empty()
        && code.len() <= 16
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !ok {
        return Err(Error::InvalidArgument(format!("invalid language code {code:?}")));
    }
    Ok(code.to_string())
}
