//! Logging setup
//!
//! Installs a global `tracing` subscriber. The filter comes from `RUST_LOG`
//! when set, otherwise from `LoggingConfig::default_filter`. Output goes to
//! stderr, or to a daily rolling file when a directory is configured.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "record-hooks.log";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_filter")]
    pub default_filter: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,

    /// Write to a daily rolling file in this directory instead of stderr
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_filter() -> String {
    "record_hooks=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: default_filter(),
            json: false,
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
    }
}

/// Initialize logging with defaults
pub fn init_logging() -> Result<()> {
    init_logging_with(&LoggingConfig::default()).map(|_| ())
}

/// Initialize logging
///
/// Returns the file writer's guard when logging to a directory; keep it
/// alive for as long as logs should be flushed. Returns `Ok(None)` without
/// changing anything if a global subscriber is already installed.
pub fn init_logging_with(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let builder = tracing_subscriber::fmt().with_env_filter(config.env_filter());

    let (result, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = builder.with_writer(writer).with_ansi(false);
            let result = if config.json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            (result, Some(guard))
        }
        None => {
            let builder = builder.with_writer(std::io::stderr);
            let result = if config.json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            (result, None)
        }
    };

    match result {
        Ok(()) => {
            tracing::info!(
                json = config.json,
                log_dir = ?config.log_dir,
                "Logging initialized"
            );
            Ok(guard)
        }
        Err(e) => {
            tracing::debug!("Logging already initialized: {}", e);
            Ok(None)
        }
    }
}
