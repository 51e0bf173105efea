//! Desktop change watcher.
//!
//! A long-running, cancellable polling state machine: capture a baseline
//! screenshot, poll the screen on an interval, perceptually diff each frame
//! against the baseline, and consult an external AI oracle once a visible
//! change occurs to decide whether the operator's task is done. All
//! per-watch resources (sleep inhibitor, temp screenshot files) are owned
//! by a [`cleanup::ResourceSet`] that guarantees exactly-once teardown on
//! every exit path.

pub mod cleanup;
pub mod diff;
pub mod frame;
pub mod inhibit;
pub mod oracle;
pub mod watcher;

pub use cleanup::ResourceSet;
pub use oracle::{ChangeOracle, FallbackOracle, HttpOracle, OracleError};
pub use watcher::{DesktopWatcher, StopFlag, WatcherOptions};
