//! Blocking operator prompts.
//!
//! A task can ask the operator a question and suspend until a reply
//! arrives on the channel. Pending prompts are kept in a FIFO correlation
//! table keyed by id; an incoming operator message resolves the oldest
//! pending prompt. Every prompt carries a deadline, and a timed-out
//! prompt's handle is removed from the table so a late reply can never
//! resolve a question that is no longer being asked.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;
use uuid::Uuid;

use errand_types::NotificationSink;

/// Why a prompt did not produce a reply.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("operator did not reply within the deadline")]
    Timeout,

    #[error("prompt was dropped before a reply arrived")]
    Closed,
}

/// Correlation table between outstanding questions and operator replies.
pub struct PromptBroker {
    pending: Mutex<VecDeque<(Uuid, oneshot::Sender<String>)>>,
    timeout: Duration,
}

impl PromptBroker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            timeout,
        }
    }

    /// Send `question` through the sink and block until the operator
    /// replies or the deadline passes.
    pub async fn ask(
        &self,
        sink: &dyn NotificationSink,
        question: &str,
    ) -> Result<String, PromptError> {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.lock().push_back((id, tx));

        tracing::debug!(%id, "prompt registered, awaiting operator reply");
        sink.send_message(question).await;

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(PromptError::Closed),
            Err(_) => {
                // Expired: drop the handle so a late reply resolves the
                // next pending prompt instead of this one.
                self.lock().retain(|(pending_id, _)| *pending_id != id);
                tracing::warn!(%id, "prompt timed out");
                Err(PromptError::Timeout)
            }
        }
    }

    /// Resolve the oldest pending prompt with `reply`.
    ///
    /// Returns `false` when no prompt was pending, in which case the
    /// caller should treat the message as ordinary operator input.
    pub fn resolve_oldest(&self, reply: &str) -> bool {
        // A prompt whose receiver is already gone (timed out between the
        // table lookup and the send) is discarded and the next one tried.
        let mut pending = self.lock();
        while let Some((id, tx)) = pending.pop_front() {
            if tx.send(reply.to_string()).is_ok() {
                tracing::debug!(%id, "prompt resolved");
                return true;
            }
        }
        false
    }

    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<(Uuid, oneshot::Sender<String>)>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
