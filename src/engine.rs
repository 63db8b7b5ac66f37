// engine.rs — Column-level entry points: embed and translate one chunk of text rows.
//
// One Engine per process, shared by reference across host threads. It owns the model
// cache; every call resolves its model through it, so a (repo, device) pair is loaded
// once no matter how many chunks ask for it at the same time.

use std::sync::Arc;

use crate::column::{compute_column, EmbeddingColumn};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::inference::{executor, generate};
use crate::models::cache::{ModelCache, ModelKey};
use crate::models::device::select_device;
use crate::models::entry::ModelEntry;
use crate::models::registry::ModelRegistry;
use crate::options::{DeviceArg, EmbedOptions, TranslateOptions};

pub struct Engine {
    config: EngineConfig,
    registry: ModelRegistry,
    cache: ModelCache<ModelEntry>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        log::info!(
            "Engine: cache_dir={} endpoint={} offline={} max_batch_rows={} max_cached_models={:?}",
            config.cache_dir.display(),
            config.hub_endpoint,
            config.offline,
            config.max_batch_rows,
            config.max_cached_models
        );
        Self {
            registry: ModelRegistry::new(&config),
            cache: ModelCache::with_capacity(config.max_cached_models),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ModelCache<ModelEntry> {
        &self.cache
    }

    /// The cached model for `(repo, device)`, loading it on first use.
    pub fn model(&self, repo: &str, device: DeviceArg) -> Result<Arc<ModelEntry>> {
        let key = ModelKey::new(repo, device);
        self.cache.get_or_load(&key, |key| {
            let device = select_device(key.device)?;
            let files = self
                .registry
                .resolve(&key.repo)
                .map_err(|e| Error::model_load(&key.repo, &e))?;
            ModelEntry::load(&files, &key.repo, &device, &self.config).map_err(|e| Error::model_load(&key.repo, &e))
        })
    }

    /// One embedding per non-null row. Null rows stay null, and a chunk with no
    /// non-null rows is answered without loading the model.
    pub fn embed_text(&self, column: &[Option<&str>], repo: &str, opts: &EmbedOptions) -> Result<EmbeddingColumn> {
        check_repo(repo)?;
        let rows = compute_column(column, |texts| {
            let entry = self.model(repo, opts.device)?;
            let model = entry.as_embedding(repo)?;
            let batch = model.tokenizer().encode(texts, opts.overflow)?;
            executor::embed(model, &batch, opts.pooling, opts.normalize, self.config.max_batch_rows)
        })?;
        EmbeddingColumn::from_rows(rows)
    }

    /// One translation per non-null row, in row order.
    pub fn translate(&self, column: &[Option<&str>], repo: &str, opts: &TranslateOptions) -> Result<Vec<Option<String>>> {
        check_repo(repo)?;
        if opts.target_language.trim().is_empty() {
            return Err(Error::InvalidArgument("target language must not be empty".into()));
        }
        if opts.max_new_tokens == Some(0) {
            return Err(Error::InvalidArgument("max_new_tokens must be at least 1".into()));
        }

        compute_column(column, |texts| {
            let entry = self.model(repo, opts.device)?;
            let model = entry.as_translation(repo)?;
            generate::translate_rows(
                model,
                repo,
                texts,
                opts,
                self.config.default_max_new_tokens,
                self.config.max_batch_rows,
            )
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn check_repo(repo: &str) -> Result<()> {
    if repo.trim().is_empty() {
        return Err(Error::InvalidArgument("model repository must not be empty".into()));
    }
    Ok(())
}
