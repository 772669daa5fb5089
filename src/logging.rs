//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level when set, e.g.
//! `RUST_LOG=armonik_worker=debug`.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Result, WorkerError};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines (for development).
    Text,
    /// JSON lines, one event per line (for production).
    #[default]
    Json,
}

impl FromStr for LogFormat {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(WorkerError::Config(format!(
                "unknown log format '{}', expected text or json",
                other
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset (`info`, `warn`, `armonik_worker=debug`...).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    /// Build the filter: `RUST_LOG` if present, the configured level otherwise.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level).map_err(|e| {
                WorkerError::Config(format!("invalid log level '{}': {}", self.level, e))
            }),
        }
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// `Config` if the level is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry.with(fmt_layer::layer().json()).try_init(),
        LogFormat::Text => registry.with(fmt_layer::layer().with_target(false)).try_init(),
    };

    installed.map_err(|e| WorkerError::Config(format!("cannot install log subscriber: {}", e)))
}
