// entry.rs — Loaded models, one variant per supported family.
//
// - Embedding: BERT encoder (sentence-transformers and plain BERT checkpoints).
// - Translation: Marian encoder-decoder (opus-mt).
//
// The family is read from config.json. Entries are immutable once built; the Marian
// decoder keeps a KV cache while generating, so its model sits behind a mutex.

use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::marian::{Config as MarianConfig, MTModel};
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::inference::language::LanguageSupport;
use crate::inference::tokenize::TokenizerAdapter;
use crate::models::device::device_name;
use crate::models::registry::{ModelFiles, WeightsFile};

/// The config.json fields needed to pick a family and size the tokenizer.
#[derive(Debug, Deserialize)]
struct ConfigHead {
    #[serde(default)]
    model_type: Option<String>,
    #[serde(default)]
    architectures: Vec<String>,
    #[serde(default)]
    hidden_size: Option<usize>,
    #[serde(default)]
    d_model: Option<usize>,
    #[serde(default)]
    max_position_embeddings: Option<usize>,
    #[serde(default)]
    pad_token_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Embedding,
    Translation,
}

impl ConfigHead {
    fn family(&self) -> anyhow::Result<ModelFamily> {
        let arch_is = |prefix: &str| self.architectures.iter().any(|a| a.starts_with(prefix));
        match self.model_type.as_deref() {
            Some("bert") => Ok(ModelFamily::Embedding),
            Some("marian") => Ok(ModelFamily::Translation),
            None if arch_is("Bert") => Ok(ModelFamily::Embedding),
            None if arch_is("Marian") => Ok(ModelFamily::Translation),
            Some(other) => bail!("unsupported model_type {other:?} (supported: bert, marian)"),
            None => bail!("config.json has no model_type and no recognizable architecture"),
        }
    }
}

pub enum ModelEntry {
    Embedding(EmbeddingModel),
    Translation(TranslationModel),
}

impl ModelEntry {
    pub fn load(files: &ModelFiles, repo: &str, device: &Device, cfg: &EngineConfig) -> anyhow::Result<Self> {
        let config_str = std::fs::read_to_string(&files.config)
            .with_context(|| format!("read {}", files.config.display()))?;
        let head: ConfigHead = serde_json::from_str(&config_str)
            .with_context(|| format!("parse {}", files.config.display()))?;

        match head.family()? {
            ModelFamily::Embedding => Ok(ModelEntry::Embedding(EmbeddingModel::load(
                files, &config_str, &head, device, cfg,
            )?)),
            ModelFamily::Translation => Ok(ModelEntry::Translation(TranslationModel::load(
                files, repo, &config_str, &head, device, cfg,
            )?)),
        }
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            ModelEntry::Embedding(_) => ModelFamily::Embedding,
            ModelEntry::Translation(_) => ModelFamily::Translation,
        }
    }

    pub fn device(&self) -> &Device {
        match self {
            ModelEntry::Embedding(m) => &m.device,
            ModelEntry::Translation(m) => &m.device,
        }
    }

    pub fn as_embedding(&self, repo: &str) -> Result<&EmbeddingModel> {
        match self {
            ModelEntry::Embedding(m) => Ok(m),
            ModelEntry::Translation(_) => Err(Error::InvalidArgument(format!(
                "{repo} is a translation model and cannot embed text"
            ))),
        }
    }

    pub fn as_translation(&self, repo: &str) -> Result<&TranslationModel> {
        match self {
            ModelEntry::Translation(m) => Ok(m),
            ModelEntry::Embedding(_) => Err(Error::InvalidArgument(format!(
                "{repo} is an embedding model and cannot translate"
            ))),
        }
    }
}

pub struct EmbeddingModel {
    pub(crate) bert: BertModel,
    pub(crate) tokenizer: TokenizerAdapter,
    pub(crate) device: Device,
    hidden_size: usize,
}

impl EmbeddingModel {
    fn load(
        files: &ModelFiles,
        config_str: &str,
        head: &ConfigHead,
        device: &Device,
        cfg: &EngineConfig,
    ) -> anyhow::Result<Self> {
        let config: BertConfig = serde_json::from_str(config_str).context("parse BERT config")?;
        let hidden_size = head.hidden_size.context("config.json has no hidden_size")?;
        let max_len = head
            .max_position_embeddings
            .unwrap_or(cfg.max_sequence_length)
            .min(cfg.max_sequence_length);

        log::info!(
            "Loading embedding model from {} on {} (hidden_size={}, max_len={})",
            files.dir.display(),
            device_name(device),
            hidden_size,
            max_len,
        );

        let vb = var_builder(&files.weights, device)?;
        let bert = BertModel::load(vb, &config).context("load BERT model")?;

        let tokenizer = TokenizerAdapter::from_file(&files.tokenizer, head.pad_token_id.unwrap_or(0), max_len)?;

        Ok(Self {
            bert,
            tokenizer,
            device: device.clone(),
            hidden_size,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn tokenizer(&self) -> &TokenizerAdapter {
        &self.tokenizer
    }
}

/// Decoder control ids read from the Marian config.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DecoderIds {
    pub decoder_start_token_id: u32,
    pub eos_token_id: u32,
    pub forced_eos_token_id: u32,
    pub pad_token_id: u32,
    pub max_position_embeddings: usize,
}

pub struct TranslationModel {
    model: Mutex<MTModel>,
    pub(crate) source: TokenizerAdapter,
    pub(crate) target: TokenizerAdapter,
    pub(crate) ids: DecoderIds,
    pub(crate) languages: LanguageSupport,
    pub(crate) device: Device,
}

impl TranslationModel {
    fn load(
        files: &ModelFiles,
        repo: &str,
        config_str: &str,
        head: &ConfigHead,
        device: &Device,
        cfg: &EngineConfig,
    ) -> anyhow::Result<Self> {
        let config: MarianConfig = serde_json::from_str(config_str).context("parse Marian config")?;
        let ids: DecoderIds = serde_json::from_str(config_str).context("parse Marian decoder ids")?;
        let max_len = ids.max_position_embeddings.min(cfg.max_sequence_length);

        log::info!(
            "Loading translation model from {} on {} (d_model={}, max_len={})",
            files.dir.display(),
            device_name(device),
            head.d_model.unwrap_or_default(),
            max_len,
        );

        let vb = var_builder(&files.weights, device)?;
        let model = MTModel::new(&config, vb).context("load Marian model")?;

        let source = TokenizerAdapter::from_file(&files.tokenizer, ids.pad_token_id, max_len)?;
        let target = match &files.target_tokenizer {
            Some(path) => TokenizerAdapter::from_file(path, ids.pad_token_id, max_len)?,
            None => TokenizerAdapter::from_file(&files.tokenizer, ids.pad_token_id, max_len)?,
        };

        let languages = LanguageSupport::from_vocab(&source.vocab(), repo);
        if languages.is_multilingual() {
            log::info!("{} accepts target languages: {}", repo, languages.target_codes().join(", "));
        }

        Ok(Self {
            model: Mutex::new(model),
            source,
            target,
            ids,
            languages,
            device: device.clone(),
        })
    }

    /// Exclusive access to the model for one generation.
    pub(crate) fn lock_model(&self) -> MutexGuard<'_, MTModel> {
        // The KV cache is reset at the start of every generation, so a poisoned
        // lock holds nothing that must be discarded.
        self.model.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn languages(&self) -> &LanguageSupport {
        &self.languages
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

fn var_builder(weights: &WeightsFile, device: &Device) -> anyhow::Result<VarBuilder<'static>> {
    match weights {
        WeightsFile::SafeTensors(path) => {
            // SAFETY: the file is not modified while mapped; cached artifacts are only
            // ever replaced by rename.
            let vb = unsafe {
                VarBuilder::from_mmaped_safetensors(&[path.clone()], DType::F32, device)
                    .with_context(|| format!("load weights from {}", path.display()))?
            };
            Ok(vb)
        }
        WeightsFile::Pytorch(path) => VarBuilder::from_pth(path, DType::F32, device)
            .with_context(|| format!("load weights from {}", path.display())),
    }
}
