//! The host process-spawn primitive, behind a trait so tests can spy on it.

use async_trait::async_trait;

use errand_types::ErrandError;

/// Raw output of one spawned command, before trimming.
#[derive(Debug, Clone)]
pub struct SpawnOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// The seam between the gateway and the host shell.
///
/// An `Err` here means the spawn facility itself failed (shell missing,
/// fork refused); a command that ran and exited non-zero is an `Ok` with
/// `success = false`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, cmd: &str) -> Result<SpawnOutput, ErrandError>;
}

/// Spawns commands through `sh -c` and waits for completion.
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, cmd: &str) -> Result<SpawnOutput, ErrandError> {
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .output()
            .await
            .map_err(|e| ErrandError::GatewayError(format!("failed to spawn shell: {e}")))?;

        Ok(SpawnOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
