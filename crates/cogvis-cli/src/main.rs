#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;

use std::process;

use anyhow::Context;

use crate::config::{Cli, create_service};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "cogvis_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "cogvis_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "cogvis_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %format!("{error:#}"),
            "command failed"
        );
    }

    eprintln!("Error: {error:#}");
    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.telemetry.init_tracing();
    cli.log();

    let service = create_service(&cli)?;

    cli.command
        .run(&service, &cli.poll, cli.text)
        .await
        .with_context(|| format!("{} failed", cli.command.name()))
}
