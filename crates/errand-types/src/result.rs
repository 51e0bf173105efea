use serde::{Deserialize, Serialize};

/// The result of one gateway call.
///
/// Always populated, even on refusal (`success = false`, reason in
/// `stderr`). The gateway trims leading/trailing whitespace from both
/// streams before constructing this.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    /// Build a result from raw process output, trimming both streams.
    pub fn from_output(success: bool, stdout: &str, stderr: &str) -> Self {
        Self {
            success,
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
        }
    }

    /// A refusal: no stdout, the reason in stderr.
    pub fn refused(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    /// A simulated response from the demo allow-list.
    pub fn simulated(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        let stdout = stdout.into();
        let stderr = stderr.into();
        Self {
            success: true,
            stdout,
            stderr,
        }
    }
}

/// Terminal outcome of one desktop watch invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchOutcome {
    pub success: bool,
    pub message: String,
}

impl WatchOutcome {
    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_output_trims_whitespace() {
        let r = ExecutionResult::from_output(true, "  hello\n", "\n");
        assert!(r.success);
        assert_eq!(r.stdout, "hello");
        assert_eq!(r.stderr, "");
    }

    #[test]
    fn refused_populates_stderr_only() {
        let r = ExecutionResult::refused("forbidden command");
        assert!(!r.success);
        assert!(r.stdout.is_empty());
        assert_eq!(r.stderr, "forbidden command");
    }

    #[test]
    fn watch_outcome_constructors() {
        assert!(WatchOutcome::completed("done").success);
        assert!(!WatchOutcome::failed("timed out").success);
    }
}
