//! Telegram Bot API transport.
//!
//! Outbound notifications go through [`sink::TelegramSink`]; inbound
//! operator messages arrive via the long-polling loop in [`poller`].

pub mod api;
pub mod poller;
pub mod sink;
pub mod types;
