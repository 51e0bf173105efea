//! Command execution gateway.
//!
//! Wraps the host process-spawn primitive behind the policy classifier: a
//! command is executed, simulated, or refused before any process is
//! spawned. The gateway's contract is "always resolves, never rejects" —
//! every outcome, including spawn failures, comes back as an
//! [`errand_types::ExecutionResult`].

pub mod gateway;
pub mod spawn;

pub use gateway::Gateway;
pub use spawn::{CommandRunner, ShellRunner, SpawnOutput};
