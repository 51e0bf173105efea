//! Command policy classifier.
//!
//! Pure decision logic mapping a raw command string and the current
//! operating mode to execute / simulate / refuse, before any process is
//! spawned. The unconditional deny-list is checked first in every mode and
//! cannot be bypassed by configuration.

pub mod classifier;
pub mod demo;
pub mod rules;

pub use classifier::classify;
