use std::path::PathBuf;

use anyhow::Context;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming};

use candle_columns::config;

pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = log_dir()?;

    // File gets everything from debug up; stderr only warnings and errors, since the
    // host's stdout is the protocol channel and stderr is what callers see.
    Logger::try_with_str("debug")?
        .log_to_file(FileSpec::default().directory(log_dir).basename(config::logging::LOG_FILE_NAME))
        .rotate(
            Criterion::Size(config::logging::LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config::logging::LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .format(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;

    let (cuda, metal) = candle_columns::models::device::available_backends();
    log::info!("{}", "=".repeat(60));
    log::info!("Column host starting");
    log::info!("Version: {}", config::HOST_VERSION);
    log::info!("Platform: {}", std::env::consts::OS);
    log::info!("GPU backends: cuda={} metal={}", cuda, metal);
    log::info!("{}", "=".repeat(60));

    Ok(())
}

fn log_dir() -> anyhow::Result<PathBuf> {
    let dir = match std::env::var(config::env::LOG_DIR) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
        _ => config::home_dir()
            .context("cannot determine home directory for logs")?
            .join(config::logging::LOG_DIR_REL),
    };
    std::fs::create_dir_all(&dir).with_context(|| format!("failed creating log dir {}", dir.display()))?;
    Ok(dir)
}
