//! Error types shared across all errand crates.

/// Errors that can occur across the errand runtime.
///
/// Each variant corresponds to a different subsystem: policy classifier,
/// command gateway, desktop watcher, notification channel, or configuration.
/// The gateway and watcher never surface these to their callers; they are
/// used internally and at setup seams.
#[derive(Debug, thiserror::Error)]
pub enum ErrandError {
    #[error("policy classification failed: {0}")]
    PolicyError(String),

    #[error("command gateway error: {0}")]
    GatewayError(String),

    #[error("desktop watcher error: {0}")]
    WatcherError(String),

    #[error("notification channel error: {0}")]
    ChannelError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}
