//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── client: ReqwestConfig       # Subscription key, API root, timeouts
//! ├── poll: PollPolicy            # Text recognition attempt budget and delay
//! ├── telemetry: TelemetryConfig  # Log format
//! ├── text: bool                  # Plain text output
//! ├── mock: MockVisionConfig      # Canned responses (feature-gated)
//! └── command: Command            # What to do
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod provider;
mod telemetry;

use std::process;

use clap::Parser;
use cogvis_core::PollPolicy;
use cogvis_reqwest::ReqwestConfig;
pub use provider::create_service;
pub use telemetry::TelemetryConfig;

use crate::command::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "cogvis")]
#[command(about = "Command-line client for the vision REST API")]
#[command(version)]
pub struct Cli {
    /// HTTP client configuration.
    #[clap(flatten)]
    pub client: ReqwestConfig,

    /// Text recognition polling configuration.
    #[clap(flatten)]
    pub poll: PollPolicy,

    /// Logging configuration.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,

    /// Prints a plain text rendering instead of JSON where one exists.
    #[arg(long, global = true)]
    pub text: bool,

    /// Serves every command from canned responses instead of the service.
    #[cfg(feature = "mock")]
    #[arg(long, global = true)]
    pub mock: bool,

    /// Mock provider configuration.
    #[cfg(feature = "mock")]
    #[clap(flatten)]
    pub mock_config: cogvis_test::MockVisionConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as defaults for every `env` backed option.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            api_root = %self.client.effective_api_root(),
            http_timeout_secs = self.client.effective_timeout().as_secs(),
            poll_max_attempts = self.poll.max_attempts(),
            poll_interval_ms = self.poll.interval().as_millis(),
            command = self.command.name(),
            "Client configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "dotenv").then_some("dotenv"),
            cfg!(feature = "mock").then_some("mock"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_recognize() {
        let cli = Cli::try_parse_from([
            "cogvis",
            "--subscription-key",
            "key",
            "--poll-max-attempts",
            "5",
            "--poll-interval-ms",
            "250",
            "recognize",
            "--url",
            "https://example.com/note.jpg",
            "--text",
        ])
        .unwrap();

        assert!(cli.text);
        assert_eq!(cli.client.subscription_key, "key");
        assert_eq!(cli.poll.max_attempts(), 5);
        assert_eq!(cli.poll.interval(), Duration::from_millis(250));
        assert_eq!(cli.command.name(), "recognize");
    }

    #[test]
    fn test_attempt_budget_out_of_range_rejected() {
        for max_attempts in ["0", "10001", "4294967295"] {
            let result = Cli::try_parse_from([
                "cogvis",
                "--subscription-key",
                "key",
                "--poll-max-attempts",
                max_attempts,
                "models",
            ]);
            assert!(result.is_err(), "{max_attempts} should be rejected");
        }
    }
}
