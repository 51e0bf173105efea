//! Operator channels.
//!
//! Two concrete notification sinks (Telegram and the local terminal), the
//! Telegram long-polling loop that receives operator messages, and the
//! prompt broker that lets a running task block on an operator reply.

pub mod prompt;
pub mod telegram;
pub mod terminal;

pub use prompt::{PromptBroker, PromptError};
pub use telegram::api::TelegramApi;
pub use telegram::sink::TelegramSink;
pub use terminal::TerminalSink;

/// Errors from a channel transport.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}
