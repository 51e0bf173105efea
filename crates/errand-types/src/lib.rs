//! Core types shared across all errand crates.
//!
//! Defines operating modes, policy decisions, execution results, watcher
//! configuration, the notification sink trait, and error types used by the
//! policy classifier, command gateway, desktop watcher, and CLI.

pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod mode;
pub mod result;
pub mod sink;

pub use config::{OracleEndpoint, OracleSettings, Settings, TelegramSettings, WatcherConfig};
pub use context::{ExecutionContext, TaskContext};
pub use decision::PolicyDecision;
pub use error::ErrandError;
pub use mode::OperatingMode;
pub use result::{ExecutionResult, WatchOutcome};
pub use sink::{NotificationSink, NullSink};
