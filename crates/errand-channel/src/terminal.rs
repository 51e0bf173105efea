//! Notification sink for tasks started from the local terminal.

use std::path::Path;

use async_trait::async_trait;

use errand_types::NotificationSink;

/// Writes status lines to stdout. Documents are referenced by path rather
/// than copied anywhere; the operator is already on the machine.
pub struct TerminalSink;

#[async_trait]
impl NotificationSink for TerminalSink {
    async fn send_message(&self, text: &str) {
        println!("{text}");
    }

    async fn send_document(&self, path: &Path, caption: Option<&str>) {
        match caption {
            Some(caption) => println!("[file] {} ({caption})", path.display()),
            None => println!("[file] {}", path.display()),
        }
    }
}
