use serde::{Deserialize, Serialize};

/// Behavioral mode of the command execution boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OperatingMode {
    /// All commands are refused with a fixed message.
    Disabled,
    /// Read-only allow-list only; matching commands are simulated, nothing
    /// touches the host.
    Demo,
    /// Only the unconditional deny-list applies; everything else executes.
    Normal,
}

impl OperatingMode {
    /// Derive the mode from the execution and demo feature flags.
    ///
    /// Demo mode only takes effect when execution is enabled at all.
    pub fn from_flags(execution_enabled: bool, demo_mode: bool) -> Self {
        if !execution_enabled {
            OperatingMode::Disabled
        } else if demo_mode {
            OperatingMode::Demo
        } else {
            OperatingMode::Normal
        }
    }
}

impl std::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatingMode::Disabled => write!(f, "disabled"),
            OperatingMode::Demo => write!(f, "demo"),
            OperatingMode::Normal => write!(f, "normal"),
        }
    }
}
