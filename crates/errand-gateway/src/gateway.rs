//! The gateway itself: classify, notify, then execute or synthesize.

use std::sync::Arc;

use errand_policy::classify;
use errand_types::{ExecutionResult, OperatingMode, PolicyDecision, TaskContext};

use crate::spawn::{CommandRunner, ShellRunner};

/// Policy-checked command execution.
///
/// One gateway is built per process with the operating mode fixed at
/// startup; the per-task [`TaskContext`] decides where notifications go.
pub struct Gateway {
    mode: OperatingMode,
    runner: Arc<dyn CommandRunner>,
}

impl Gateway {
    /// Gateway over the real host shell.
    pub fn new(mode: OperatingMode) -> Self {
        Self::with_runner(mode, Arc::new(ShellRunner))
    }

    /// Gateway over a custom spawn primitive (used by tests and by the
    /// watcher's capture spies).
    pub fn with_runner(mode: OperatingMode, runner: Arc<dyn CommandRunner>) -> Self {
        Self { mode, runner }
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Run one command. Always resolves; never returns an error.
    ///
    /// Refusals and simulations are echoed to the operator through the
    /// context's sink; delivery failures there cannot fail this call.
    pub async fn run(&self, cmd: &str, ctx: &TaskContext) -> ExecutionResult {
        match classify(cmd, self.mode) {
            PolicyDecision::Refuse { reason } => {
                tracing::warn!(%cmd, mode = %self.mode, %reason, "command refused");
                ctx.sink()
                    .send_message(&format!(
                        "errand attempted to run a blocked command: {cmd}. Execution was refused."
                    ))
                    .await;
                ExecutionResult::refused(reason)
            }
            PolicyDecision::Simulate { stdout, stderr } => {
                tracing::info!(%cmd, "simulating allow-listed command");
                ctx.sink()
                    .send_message(&format!("[demo] simulating safe command: {cmd}"))
                    .await;
                ExecutionResult::simulated(stdout, stderr)
            }
            PolicyDecision::Execute => match self.runner.run(cmd).await {
                Ok(out) => {
                    tracing::debug!(%cmd, success = out.success, "command completed");
                    ExecutionResult::from_output(out.success, &out.stdout, &out.stderr)
                }
                Err(e) => {
                    // Spawn-facility failure is a result, not an exception.
                    tracing::error!(%cmd, error = %e, "spawn facility failed");
                    ExecutionResult {
                        success: false,
                        stdout: String::new(),
                        stderr: e.to_string(),
                    }
                }
            },
        }
    }
}
