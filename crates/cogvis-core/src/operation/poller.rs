//! The poll loop.

use std::time::Instant;

use tokio_util::sync::CancellationToken;

use super::{OperationQuery, PollError, PollPolicy, TRACING_TARGET};
use crate::contract::{TextOperation, TextOperationResult};

/// Polls an operation until it reaches a terminal status.
///
/// The first query is issued immediately. Every `NotStarted` or `Running`
/// result counts as one attempt; once the count exceeds
/// [`PollPolicy::max_attempts`] the session fails with
/// [`PollError::Timeout`], otherwise it sleeps for
/// [`PollPolicy::interval`] and queries again.
///
/// - `Succeeded` is returned with its recognized content.
/// - `Failed` is returned as a result with no content, not as an error.
/// - A failed status query ends the session with [`PollError::Transport`].
/// - Cancelling `cancel` before a query, while a query is in flight, or
///   during a delay ends the session with [`PollError::Cancelled`]. An
///   in-flight query is allowed to finish, and a terminal result it returns
///   is still reported.
pub async fn poll<Q>(
    query: &Q,
    operation: &TextOperation,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<TextOperationResult, PollError>
where
    Q: OperationQuery + ?Sized,
{
    let started_at = Instant::now();
    let max_attempts = policy.max_attempts();
    let mut attempts: u32 = 0;

    tracing::debug!(
        target: TRACING_TARGET,
        location = %operation,
        max_attempts,
        interval_ms = policy.interval().as_millis(),
        "Polling text operation"
    );

    loop {
        if cancel.is_cancelled() {
            return Err(cancelled(operation, attempts));
        }

        attempts += 1;
        let result = match query.query_operation(operation).await {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    location = %operation,
                    attempt = attempts,
                    error = %error,
                    "Status query failed"
                );
                return Err(PollError::Transport(error));
            }
        };

        tracing::trace!(
            target: TRACING_TARGET,
            location = %operation,
            attempt = attempts,
            status = %result.status,
            "Status query completed"
        );

        if result.is_terminal() {
            tracing::debug!(
                target: TRACING_TARGET,
                location = %operation,
                attempts,
                status = %result.status,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Text operation finished"
            );
            return Ok(result.normalized());
        }

        if cancel.is_cancelled() {
            return Err(cancelled(operation, attempts));
        }

        if attempts > max_attempts {
            tracing::warn!(
                target: TRACING_TARGET,
                location = %operation,
                attempts,
                max_attempts,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Text operation still pending, giving up"
            );
            return Err(PollError::Timeout {
                attempts,
                max_attempts,
            });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(operation, attempts)),
            _ = tokio::time::sleep(policy.interval()) => {}
        }
    }
}

fn cancelled(operation: &TextOperation, attempts: u32) -> PollError {
    tracing::debug!(
        target: TRACING_TARGET,
        location = %operation,
        attempts,
        "Polling cancelled"
    );
    PollError::Cancelled { attempts }
}
