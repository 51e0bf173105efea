//! Sleep inhibition for the duration of a watch.
//!
//! Holds a `systemd-inhibit ... sleep infinity` child so the screen cannot
//! blank or the machine suspend while frames are being compared. The child
//! is killed through the watch's [`ResourceSet`](crate::ResourceSet).

use std::process::{Child, Command, Stdio};

use errand_types::ErrandError;

/// Default inhibitor invocation.
pub const DEFAULT_INHIBITOR_CMD: &[&str] = &[
    "systemd-inhibit",
    "--what=idle:sleep:handle-lid-switch",
    "--why=errand desktop watch",
    "sleep",
    "infinity",
];

/// A held sleep-inhibitor process.
pub struct SleepInhibitor {
    child: Child,
}

impl SleepInhibitor {
    /// Spawn the inhibitor command (program followed by its arguments).
    pub fn acquire(cmd: &[String]) -> Result<Self, ErrandError> {
        let (program, args) = cmd.split_first().ok_or_else(|| {
            ErrandError::WatcherError("inhibitor command is empty".into())
        })?;

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                ErrandError::WatcherError(format!("failed to spawn sleep inhibitor: {e}"))
            })?;

        tracing::debug!(pid = child.id(), "sleep inhibitor acquired");
        Ok(Self { child })
    }

    /// Terminate the inhibitor and reap it.
    pub fn kill(mut self) {
        if let Err(e) = self.child.kill() {
            tracing::warn!(error = %e, "failed to kill sleep inhibitor");
        }
        let _ = self.child.wait();
        tracing::debug!("sleep inhibitor released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_vec(cmd: &[&str]) -> Vec<String> {
        cmd.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn acquire_and_kill_long_running_process() {
        let inhibitor =
            SleepInhibitor::acquire(&to_vec(&["sleep", "60"])).expect("sleep should spawn");
        inhibitor.kill();
    }

    #[test]
    fn acquire_missing_binary_fails() {
        let result = SleepInhibitor::acquire(&to_vec(&["errand-no-such-binary"]));
        assert!(result.is_err());
    }

    #[test]
    fn acquire_empty_command_fails() {
        assert!(SleepInhibitor::acquire(&[]).is_err());
    }
}
