//! The notification sink trait: how the boundary layer talks to the operator.

use std::path::Path;

use async_trait::async_trait;

/// Delivers human-readable status text and files to whichever channel the
/// current task arrived on.
///
/// Implementations must be safe to call when the underlying channel is
/// unavailable: they log and swallow delivery failures rather than
/// returning them. The gateway and watcher treat every send as
/// fire-and-forget.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a status line to the operator.
    async fn send_message(&self, text: &str);

    /// Deliver a file (e.g. the final screenshot) with an optional caption.
    async fn send_document(&self, path: &Path, caption: Option<&str>);
}

/// Sink that drops everything. Used by detached task contexts and tests.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn send_message(&self, text: &str) {
        tracing::debug!(text, "notification dropped (no active channel)");
    }

    async fn send_document(&self, path: &Path, _caption: Option<&str>) {
        tracing::debug!(path = %path.display(), "document dropped (no active channel)");
    }
}
