//! Text recognition session with Ctrl-C cancellation.

use anyhow::Context;
use cogvis_core::contract::{ImageSource, TextOperationResult, TextRecognitionMode};
use cogvis_core::{PollError, PollPolicy, VisionService};
use tokio::signal::ctrl_c;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_COMMAND;

/// Submits the image and polls the operation until it finishes.
///
/// The first Ctrl-C cancels the session between attempts.
pub async fn run(
    service: &VisionService,
    image: ImageSource,
    mode: TextRecognitionMode,
    policy: PollPolicy,
) -> anyhow::Result<TextOperationResult> {
    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        mode = %mode,
        max_attempts = policy.max_attempts(),
        interval_ms = policy.interval().as_millis(),
        "Recognizing text"
    );

    let handle = service.spawn_recognize_text(image, mode, policy);
    let interrupt = tokio::spawn(cancel_on_interrupt(handle.cancellation_token()));

    let outcome = handle.join().await;
    interrupt.abort();

    match outcome {
        Ok(result) => Ok(result),
        Err(PollError::Cancelled { attempts }) => {
            anyhow::bail!("recognition cancelled after {attempts} status queries")
        }
        Err(error) => Err(error).context("recognition did not complete"),
    }
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    match ctrl_c().await {
        Ok(()) => {
            tracing::warn!(
                target: TRACING_TARGET_COMMAND,
                "Received Ctrl+C signal, cancelling recognition"
            );
            cancel.cancel();
        }
        Err(e) => {
            tracing::error!(
                target: TRACING_TARGET_COMMAND,
                error = %e,
                "Failed to install Ctrl+C handler"
            );
        }
    }
}
