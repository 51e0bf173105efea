//! Notification sink backed by the Telegram Bot API.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use errand_types::NotificationSink;

use super::api::TelegramApi;

/// Delivery attempts before a notification is dropped.
const SEND_ATTEMPTS: u32 = 3;

/// Base pause between attempts; attempt `n` waits `n` times this.
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Sends notifications to the configured chat, retrying transient
/// delivery failures. Per the [`NotificationSink`] contract a send that
/// still fails after all attempts is logged and swallowed.
pub struct TelegramSink {
    api: Arc<TelegramApi>,
    chat_id: i64,
    retry_pause: Duration,
}

impl TelegramSink {
    pub fn new(api: Arc<TelegramApi>, chat_id: i64) -> Self {
        Self {
            api,
            chat_id,
            retry_pause: RETRY_PAUSE,
        }
    }

    #[cfg(test)]
    fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send_message(&self, text: &str) {
        for attempt in 1..=SEND_ATTEMPTS {
            match self.api.send_message(self.chat_id, text).await {
                Ok(_) => return,
                Err(e) if attempt < SEND_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "sendMessage failed, retrying");
                    tokio::time::sleep(self.retry_pause * attempt).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "notification dropped after {SEND_ATTEMPTS} attempts");
                }
            }
        }
    }

    async fn send_document(&self, path: &Path, caption: Option<&str>) {
        // A file that vanished before upload (a released temp screenshot)
        // degrades to a text notice instead of retrying a hopeless upload.
        if !path.exists() {
            tracing::warn!(path = %path.display(), "document missing, sending notice instead");
            self.send_message(&format!("file no longer available: {}", path.display()))
                .await;
            return;
        }

        for attempt in 1..=SEND_ATTEMPTS {
            match self.api.send_document(self.chat_id, path, caption).await {
                Ok(()) => return,
                Err(e) if attempt < SEND_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "sendDocument failed, retrying");
                    tokio::time::sleep(self.retry_pause * attempt).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "document dropped after {SEND_ATTEMPTS} attempts");
                }
            }
        }
    }
}
