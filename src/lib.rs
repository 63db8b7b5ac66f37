// lib.rs — Null-aware, batched text embedding and translation over column chunks.
//
// Models come from a remote registry (or a local directory), run on CPU or GPU through
// candle, and are cached per (repository, device) for the life of an `Engine`.

pub mod column;
pub mod config;
pub mod engine;
pub mod error;
pub mod inference;
pub mod models;
pub mod options;

#[cfg(test)]
mod testing;

pub use column::{compute_column, EmbeddingColumn};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use models::cache::{CacheStats, ModelCache, ModelKey};
pub use options::{
    DeviceArg, EmbedOptions, EmbeddingKwargs, Overflow, Pooling, TranslateKwargs, TranslateOptions,
};
