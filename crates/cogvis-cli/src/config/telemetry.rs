//! Logging configuration.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter when `RUST_LOG` is unset or blank.
const DEFAULT_FILTER: &str = "info";

/// Output format of log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

/// Logging configuration options.
///
/// Records are written to stderr so command output on stdout stays clean.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct TelemetryConfig {
    /// Format of log records.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    #[serde(default)]
    pub log_format: LogFormat,
}

impl TelemetryConfig {
    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing(&self) {
        let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let registry = tracing_subscriber::registry().with(env_filter(directives.as_deref()));
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        match self.log_format {
            LogFormat::Text => registry.with(layer).init(),
            LogFormat::Json => registry.with(layer.json()).init(),
        }
    }
}

/// Builds the filter from `RUST_LOG` directives, falling back to [`DEFAULT_FILTER`].
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
