use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "QSOBOARD_LOG";

fn env_filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .with_context(|| format!("Invalid log filter '{default_level}'"))
}

/// Initialize file logging for the full-screen dashboard.
///
/// The terminal belongs to the display, so events go through a non-blocking
/// writer to `config.file`. Keep the returned guard alive until exit or the
/// tail of the log is lost.
pub fn init_file_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let filter = env_filter(&config.level)?;
    let directory = config
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = config
        .file
        .file_name()
        .with_context(|| format!("Log path {} has no file name", config.file.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("Failed to install log subscriber")?;
    Ok(guard)
}

/// Initialize stderr logging for headless commands.
pub fn init_stderr_logging(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(&config.level)?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("Failed to install log subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os(LOG_ENV).is_some() {
            return;
        }
        assert!(env_filter("qsoboard_core=loud").is_err());
        assert!(env_filter("info").is_ok());
    }
}
