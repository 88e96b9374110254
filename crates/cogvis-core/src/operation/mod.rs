//! Polling of long-running text recognition operations.
//!
//! A poll session queries a [`TextOperation`] until the service reports a
//! terminal status, the [`PollPolicy`] attempt budget runs out, or the caller
//! cancels. Sessions share no state: the policy is immutable and the status
//! query collaborator is only borrowed for the duration of one session.
//!
//! # Example
//!
//! ```rust,ignore
//! use cogvis_core::operation::{PollPolicy, poll};
//! use tokio_util::sync::CancellationToken;
//!
//! let operation = service.create_text_operation(&image, TextRecognitionMode::Handwritten).await?;
//! let result = poll(&service, &operation, &PollPolicy::default(), &CancellationToken::new()).await?;
//! ```

mod error;
mod policy;
mod poller;

pub use error::PollError;
pub use policy::{DEFAULT_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS_LIMIT, PollPolicy};
pub use poller::poll;

use crate::Result;
use crate::contract::{TextOperation, TextOperationResult};

/// Tracing target for poll sessions.
pub const TRACING_TARGET: &str = "cogvis_core::operation";

/// Status query collaborator used by the poller.
///
/// Implementations issue `GET <operation.location>` and decode the body.
/// Connectivity failures, non-success responses and malformed payloads must
/// all be reported as errors; the poller does not retry them.
#[async_trait::async_trait]
pub trait OperationQuery: Send + Sync {
    /// Queries the current state of an operation.
    async fn query_operation(&self, operation: &TextOperation) -> Result<TextOperationResult>;
}
