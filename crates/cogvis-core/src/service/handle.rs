//! Handle of a background recognition session.

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::contract::TextOperationResult;
use crate::operation::PollError;

/// Handle of a text recognition session running on a background task.
///
/// The session holds no reference back to the handle's owner. Dropping the
/// handle, or the future returned by [`join`](Self::join), cancels the
/// session between attempts.
#[derive(Debug)]
#[must_use = "dropping the handle cancels the session"]
pub struct RecognitionHandle {
    cancel: CancellationToken,
    guard: DropGuard,
    task: JoinHandle<Result<TextOperationResult, PollError>>,
}

impl RecognitionHandle {
    pub(super) fn new(
        cancel: CancellationToken,
        task: JoinHandle<Result<TextOperationResult, PollError>>,
    ) -> Self {
        Self {
            guard: cancel.clone().drop_guard(),
            cancel,
            task,
        }
    }

    /// Requests cancellation; the session reports [`PollError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a token that cancels this session when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns `true` once the session has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the session outcome.
    ///
    /// A task that panicked or was shut down with its runtime reports
    /// [`PollError::Aborted`].
    pub async fn join(self) -> Result<TextOperationResult, PollError> {
        let Self { guard, task, .. } = self;

        let outcome = task.await;
        guard.disarm();

        outcome.map_err(PollError::Aborted)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::contract::OperationStatus;

    #[tokio::test]
    async fn test_panicked_session_is_aborted() {
        let cancel = CancellationToken::new();
        let task: JoinHandle<Result<TextOperationResult, PollError>> =
            tokio::spawn(async { panic!("provider bug") });

        let error = RecognitionHandle::new(cancel, task).join().await.unwrap_err();

        assert!(error.is_aborted());
        assert!(error.transport().is_none());
        assert_eq!(error.kind(), ErrorKind::InternalError);
        assert_eq!(error.attempts(), None);
    }

    #[tokio::test]
    async fn test_join_returns_session_outcome() {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(async { Ok(TextOperationResult::failed()) });

        let handle = RecognitionHandle::new(cancel.clone(), task);
        let result = handle.join().await.unwrap();

        assert_eq!(result.status, OperationStatus::Failed);
        assert!(!cancel.is_cancelled());
    }
}
