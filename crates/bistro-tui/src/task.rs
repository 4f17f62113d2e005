//! Background chat requests.

use bistro_engine::{BackendError, ChatBackend, ChatReply, PendingTurn};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

/// A dispatched turn running on its own task so the UI keeps drawing.
#[derive(Debug)]
pub struct ChatTask {
    seq: u64,
    handle: JoinHandle<Result<ChatReply, BackendError>>,
}

impl ChatTask {
    /// Spawn the backend call for `turn`.
    pub fn spawn<B: ChatBackend>(backend: Arc<B>, turn: PendingTurn) -> Self {
        let PendingTurn { seq, request } = turn;
        let handle = tokio::spawn(async move { backend.chat(&request).await });
        Self { seq, handle }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the result. A task that panicked or was cancelled becomes an
    /// [`BackendError::Interrupted`] so the turn still completes.
    pub async fn join(self) -> (u64, Result<ChatReply, BackendError>) {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!(seq = self.seq, error = %e, "Chat task did not finish");
                Err(BackendError::Interrupted(e.to_string()))
            }
        };
        (self.seq, result)
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Take the result out of `slot` if its task has finished.
pub async fn poll_finished(
    slot: &mut Option<ChatTask>,
) -> Option<(u64, Result<ChatReply, BackendError>)> {
    if !slot.as_ref().is_some_and(ChatTask::is_finished) {
        return None;
    }
    let task = slot.take()?;
    Some(task.join().await)
}
