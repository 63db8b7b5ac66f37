// error.rs — Error taxonomy surfaced to the host for a failed column chunk.
//
// Every variant fails the whole chunk. There is no partial-success mode.

use crate::options::DeviceArg;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("failed to load model {repo}: {reason}")]
    ModelLoad { repo: String, reason: String },

    #[error("device {device} unavailable: {reason}")]
    DeviceUnavailable { device: DeviceArg, reason: String },

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    // Kept behind an Arc so load failures can be handed to every blocked caller.
    #[error("device execution failed: {0}")]
    DeviceExecution(#[source] std::sync::Arc<candle_core::Error>),

    #[error("language {language:?} is not supported by {repo}")]
    UnsupportedLanguage { language: String, repo: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A broken invariant inside the crate, never the caller's input.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable name of the error class, used by the host protocol.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ModelLoad { .. } => "ModelLoadError",
            Error::DeviceUnavailable { .. } => "DeviceUnavailableError",
            Error::Tokenization(_) => "TokenizationError",
            Error::DeviceExecution(_) => "DeviceExecutionError",
            Error::UnsupportedLanguage { .. } => "UnsupportedLanguageError",
            Error::InvalidArgument(_) => "InvalidArgumentError",
            Error::Internal(_) => "InternalError",
        }
    }

    pub(crate) fn model_load(repo: &str, err: &anyhow::Error) -> Self {
        Error::ModelLoad {
            repo: repo.to_string(),
            // `{:#}` keeps the whole context chain on one line.
            reason: format!("{err:#}"),
        }
    }
}

impl From<candle_core::Error> for Error {
    fn from(e: candle_core::Error) -> Self {
        Error::DeviceExecution(std::sync::Arc::new(e))
    }
}

impl From<tokenizers::Error> for Error {
    fn from(e: tokenizers::Error) -> Self {
        Error::Tokenization(e.to_string())
    }
}
