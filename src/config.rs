// config.rs — Centralized constants and the engine configuration.
//
// IMPORTANT:
// Keep ALL numeric values centralized here (repo rule: no hardcoded numeric values scattered around).

use std::path::PathBuf;

// NOTE: HOST_VERSION must stay in sync with the `version` field in Cargo.toml.
pub const HOST_VERSION: &str = "0.3.0";

pub mod logging {
    pub const LOG_DIR_REL: &str = ".candle_columns/logs";
    pub const LOG_FILE_NAME: &str = "column_host.log";

    pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
    pub const LOG_ROTATE_KEEP_FILES: usize = 5;
}

pub mod host {
    // Frames are a u32 little-endian length followed by a JSON body.
    pub const MAX_MESSAGE_SIZE_BYTES: u32 = 128 * 1024 * 1024;
}

pub mod registry {
    pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";
    pub const DEFAULT_REVISION: &str = "main";

    // Relative to home. Repos are stored as `<owner>--<name>` below this directory.
    pub const MODEL_CACHE_DIR_REL: &str = ".candle_columns/models";

    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 300;
    // The hub answers LFS files with a redirect to a CDN, sometimes two hops deep.
    pub const MAX_REDIRECTS: usize = 5;

    pub const CONFIG_FILE: &str = "config.json";
    pub const TOKENIZER_FILE: &str = "tokenizer.json";
    pub const TARGET_TOKENIZER_FILE: &str = "tokenizer_target.json";
    pub const SAFETENSORS_FILE: &str = "model.safetensors";
    pub const PYTORCH_FILE: &str = "pytorch_model.bin";

    // Registry header carrying the SHA256 of LFS-stored files. Sent on the redirect,
    // not on the CDN response it points to.
    pub const SHA256_HEADER: &str = "x-linked-etag";
}

pub mod inference {
    // Upper bound on tokens per row, regardless of what the model config allows.
    pub const MAX_SEQUENCE_LENGTH: usize = 512;

    // Rows per forward pass. Larger column chunks are split into sub-batches.
    pub const MAX_BATCH_ROWS: usize = 256;

    // Generation bound when the caller does not give one.
    pub const DEFAULT_MAX_NEW_TOKENS: usize = 256;

    // Norms below this are treated as the zero vector.
    pub const NORM_EPSILON: f64 = 1e-12;
}

pub mod env {
    pub const CACHE_DIR: &str = "CANDLE_COLUMNS_CACHE_DIR";
    pub const HUB_ENDPOINT: &str = "CANDLE_COLUMNS_HUB_ENDPOINT";
    pub const REVISION: &str = "CANDLE_COLUMNS_REVISION";
    pub const OFFLINE: &str = "CANDLE_COLUMNS_OFFLINE";
    pub const MAX_BATCH_ROWS: &str = "CANDLE_COLUMNS_MAX_BATCH_ROWS";
    pub const MAX_CACHED_MODELS: &str = "CANDLE_COLUMNS_MAX_CACHED_MODELS";
    // Host binary only: where column_host writes its rotating log.
    pub const LOG_DIR: &str = "CANDLE_COLUMNS_LOG_DIR";
}

/// Runtime configuration for an [`crate::Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where downloaded model artifacts are stored.
    pub cache_dir: PathBuf,
    /// Base URL of the model registry.
    pub hub_endpoint: String,
    pub revision: String,
    /// Never touch the network; only local directories and already-cached repos resolve.
    pub offline: bool,
    pub max_sequence_length: usize,
    pub max_batch_rows: usize,
    pub default_max_new_tokens: usize,
    /// `None` keeps every loaded model for the lifetime of the engine.
    pub max_cached_models: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: home_dir()
                .map(|h| h.join(registry::MODEL_CACHE_DIR_REL))
                .unwrap_or_else(|| std::env::temp_dir().join("candle_columns_models")),
            hub_endpoint: registry::DEFAULT_ENDPOINT.to_string(),
            revision: registry::DEFAULT_REVISION.to_string(),
            offline: false,
            max_sequence_length: inference::MAX_SEQUENCE_LENGTH,
            max_batch_rows: inference::MAX_BATCH_ROWS,
            default_max_new_tokens: inference::DEFAULT_MAX_NEW_TOKENS,
            max_cached_models: None,
        }
    }
}

impl EngineConfig {
    /// Defaults, overridden by `CANDLE_COLUMNS_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(v) = env_var(env::CACHE_DIR) {
            cfg.cache_dir = PathBuf::from(v);
        }
        if let Some(v) = env_var(env::HUB_ENDPOINT) {
            cfg.hub_endpoint = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = env_var(env::REVISION) {
            cfg.revision = v;
        }
        if let Some(v) = env_var(env::OFFLINE) {
            cfg.offline = matches!(v.as_str(), "1" | "true" | "yes");
        }
        match env_var(env::MAX_BATCH_ROWS).map(|v| v.parse::<usize>()) {
            Some(Ok(n)) if n > 0 => cfg.max_batch_rows = n,
            Some(_) => log::warn!("Ignoring invalid {}", env::MAX_BATCH_ROWS),
            None => {}
        }
        match env_var(env::MAX_CACHED_MODELS).map(|v| v.parse::<usize>()) {
            Some(Ok(n)) if n > 0 => cfg.max_cached_models = Some(n),
            Some(_) => log::warn!("Ignoring invalid {}", env::MAX_CACHED_MODELS),
            None => {}
        }
        cfg
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn home_dir() -> Option<PathBuf> {
    if let Ok(v) = std::env::var("HOME") {
        if !v.is_empty() {
            return Some(PathBuf::from(v));
        }
    }
    // Windows fallback
    if let Ok(v) = std::env::var("USERPROFILE") {
        if !v.is_empty() {
            return Some(PathBuf::from(v));
        }
    }
    None
}
