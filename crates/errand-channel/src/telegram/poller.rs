//! Long-polling loop for Telegram Bot API `getUpdates`.
//!
//! Filters incoming updates to the single authorized chat and forwards
//! their text through a channel. Interpretation of the text (prompt reply,
//! watch cancellation, new task) happens on the receiving side.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::api::TelegramApi;

/// Run the long-polling loop until the cancellation token fires.
///
/// Messages from any other chat are acknowledged (the offset advances)
/// but never forwarded.
pub async fn poll_loop(
    api: Arc<TelegramApi>,
    chat_id: i64,
    poll_timeout: u64,
    message_tx: mpsc::Sender<String>,
    mut cancel: watch::Receiver<bool>,
) {
    let mut offset: Option<i64> = None;
    let mut backoff_secs = 1u64;

    info!(chat_id, "Telegram poller started");

    loop {
        if *cancel.borrow() {
            info!("Telegram poller shutting down");
            return;
        }

        let updates = tokio::select! {
            result = api.get_updates(offset, poll_timeout) => result,
            _ = cancel.changed() => {
                info!("Telegram poller cancelled");
                return;
            }
        };

        match updates {
            Ok(updates) => {
                backoff_secs = 1;

                for update in updates {
                    // Advance the offset to acknowledge this update.
                    offset = Some(update.update_id + 1);

                    let Some(msg) = update.message else { continue };
                    if msg.chat.id != chat_id {
                        debug!(
                            from_chat = msg.chat.id,
                            expected = chat_id,
                            "ignoring message from unauthorized chat"
                        );
                        continue;
                    }

                    let Some(text) = msg.text else { continue };
                    if message_tx.send(text).await.is_err() {
                        warn!("message channel closed, stopping poller");
                        return;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, backoff_secs, "getUpdates failed, backing off");
                tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                backoff_secs = (backoff_secs * 2).min(60);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn update(update_id: i64, chat_id: i64, text: &str) -> serde_json::Value {
        json!({
            "update_id": update_id,
            "message": {
                "message_id": update_id,
                "chat": {"id": chat_id},
                "text": text
            }
        })
    }

    #[tokio::test]
    async fn forwards_authorized_messages_and_filters_the_rest() {
        let server = MockServer::start().await;

        // First poll returns one authorized and one foreign message, every
        // later poll is empty.
        Mock::given(method("POST"))
            .and(path_regex(r"/bot.*/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [update(1, 999, "ignored"), update(2, 12345, "stop")]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"/bot.*/getUpdates"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": []})),
            )
            .mount(&server)
            .await;

        let api = Arc::new(TelegramApi::with_base_url("test-token", &server.uri()));
        let (message_tx, mut message_rx) = mpsc::channel(8);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let poller = tokio::spawn(poll_loop(api, 12345, 0, message_tx, cancel_rx));

        let text = tokio::time::timeout(Duration::from_secs(5), message_rx.recv())
            .await
            .expect("poller should forward within the deadline")
            .expect("channel open");
        assert_eq!(text, "stop");

        // Nothing else was forwarded.
        assert!(message_rx.try_recv().is_err());

        cancel_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), poller)
            .await
            .expect("poller should stop on cancel")
            .unwrap();
    }

    #[tokio::test]
    async fn poller_stops_when_receiver_is_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"/bot.*/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [update(1, 12345, "hello")]
            })))
            .mount(&server)
            .await;

        let api = Arc::new(TelegramApi::with_base_url("test-token", &server.uri()));
        let (message_tx, message_rx) = mpsc::channel(8);
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        drop(message_rx);

        let poller = tokio::spawn(poll_loop(api, 12345, 0, message_tx, cancel_rx));
        tokio::time::timeout(Duration::from_secs(5), poller)
            .await
            .expect("poller should exit once the channel closes")
            .unwrap();
    }
}
