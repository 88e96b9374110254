//! Poll session failures.

use thiserror::Error;
use tokio::task::JoinError;

use crate::{Error, ErrorKind};

/// Reasons a poll session ends without a terminal result.
///
/// A `Failed` status reported by the service is not one of them: it is
/// returned as a regular [`TextOperationResult`](crate::contract::TextOperationResult)
/// and callers inspect its status.
#[derive(Debug, Error)]
pub enum PollError {
    /// A status query failed; it is never retried.
    #[error("status query failed: {0}")]
    Transport(#[source] Error),

    /// The attempt budget ran out while the operation was still pending.
    #[error("operation still pending after {attempts} status queries (max attempts {max_attempts})")]
    Timeout {
        /// Number of status queries issued.
        attempts: u32,
        /// Budget of the policy that was exhausted.
        max_attempts: u32,
    },

    /// The caller cancelled the session.
    #[error("polling cancelled after {attempts} status queries")]
    Cancelled {
        /// Number of status queries issued before cancellation.
        attempts: u32,
    },

    /// The task running a spawned session panicked or was shut down.
    #[error("recognition task did not complete: {0}")]
    Aborted(#[source] JoinError),
}

impl PollError {
    /// Returns `true` if the attempt budget ran out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the caller cancelled the session.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns `true` if the task running the session died.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Returns the underlying transport error, if any.
    pub fn transport(&self) -> Option<&Error> {
        match self {
            Self::Transport(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the number of status queries issued, when known.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Transport(_) | Self::Aborted(_) => None,
            Self::Timeout { attempts, .. } | Self::Cancelled { attempts } => Some(*attempts),
        }
    }

    /// Classifies the failure with the crate-wide error kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(error) => error.kind,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled { .. } => ErrorKind::Unknown,
            Self::Aborted(_) => ErrorKind::InternalError,
        }
    }
}

impl From<Error> for PollError {
    fn from(error: Error) -> Self {
        Self::Transport(error)
    }
}
