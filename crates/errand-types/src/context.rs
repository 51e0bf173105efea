//! Per-task execution context.
//!
//! "Which channel is active" is an explicit value threaded through every
//! gateway and watcher call, never process-global state, so concurrent
//! tasks cannot cross-notify the wrong channel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::sink::{NotificationSink, NullSink};

/// Which channel a task arrived on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Remote chat channel (Telegram).
    Remote,
    /// Local interactive terminal.
    Local,
}

impl std::fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionContext::Remote => write!(f, "remote"),
            ExecutionContext::Local => write!(f, "local"),
        }
    }
}

/// The channel label plus the sink that delivers notifications for one task.
///
/// Cheap to clone; carried by value into the gateway and watcher.
#[derive(Clone)]
pub struct TaskContext {
    channel: ExecutionContext,
    sink: Arc<dyn NotificationSink>,
}

impl TaskContext {
    pub fn new(channel: ExecutionContext, sink: Arc<dyn NotificationSink>) -> Self {
        Self { channel, sink }
    }

    /// A context with no operator attached. Notifications are logged and
    /// dropped.
    pub fn detached() -> Self {
        Self {
            channel: ExecutionContext::Local,
            sink: Arc::new(NullSink),
        }
    }

    pub fn channel(&self) -> ExecutionContext {
        self.channel
    }

    pub fn sink(&self) -> &dyn NotificationSink {
        self.sink.as_ref()
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
