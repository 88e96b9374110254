//! Vision service construction.

use anyhow::Context;
use cogvis_core::VisionService;
use cogvis_reqwest::ReqwestClient;

use super::Cli;
use crate::TRACING_TARGET_CONFIG;

/// Creates the vision service selected by the CLI configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be initialized.
pub fn create_service(cli: &Cli) -> anyhow::Result<VisionService> {
    #[cfg(feature = "mock")]
    if cli.mock {
        tracing::info!(target: TRACING_TARGET_CONFIG, "Using mock vision provider");
        let provider = cogvis_test::MockVisionProvider::new(cli.mock_config.clone());
        return Ok(VisionService::new(provider));
    }

    let client =
        ReqwestClient::new(cli.client.clone()).context("failed to create vision client")?;

    tracing::debug!(
        target: TRACING_TARGET_CONFIG,
        api_root = client.api_root(),
        "Using HTTP vision provider"
    );

    Ok(client.into_service())
}
