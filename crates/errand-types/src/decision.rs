use serde::{Deserialize, Serialize};

/// The outcome of classifying one command against the active policy.
///
/// Produced once per command by the policy classifier and never retried
/// automatically. The gateway maps it onto a spawned process, a synthesized
/// response, or a refusal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Run the command through the host shell.
    Execute,
    /// Return a synthesized response without touching the host.
    Simulate {
        stdout: String,
        stderr: String,
    },
    /// Do not run the command.
    Refuse {
        /// Human-readable explanation, surfaced to the operator.
        reason: String,
    },
}

impl PolicyDecision {
    /// Build a refusal with the given reason.
    pub fn refuse(reason: impl Into<String>) -> Self {
        PolicyDecision::Refuse {
            reason: reason.into(),
        }
    }

    /// Build a simulated success with the given stdout and empty stderr.
    pub fn simulate(stdout: impl Into<String>) -> Self {
        PolicyDecision::Simulate {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}
