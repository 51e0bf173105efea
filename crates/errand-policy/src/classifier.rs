//! The classification function: command string + mode -> decision.

use errand_types::{OperatingMode, PolicyDecision};

use crate::demo;
use crate::rules::{DEMO_ALLOWED, DEMO_FORBIDDEN, FORBIDDEN};

/// Classify a raw command string under the given operating mode.
///
/// Evaluation order is fixed:
/// 1. the unconditional deny-list, in every mode;
/// 2. the disabled-mode blanket refusal;
/// 3. in demo mode, the demo deny-list, then the read-only allow-list;
/// 4. in normal mode, execute.
///
/// Deny-lists always precede allow-lists, and the first matching pattern
/// determines the outcome.
pub fn classify(cmd: &str, mode: OperatingMode) -> PolicyDecision {
    let cmd = cmd.trim();

    if let Some(pattern) = FORBIDDEN.iter().find(|re| re.is_match(cmd)) {
        tracing::warn!(%cmd, pattern = pattern.as_str(), "command matched unconditional deny-list");
        return PolicyDecision::refuse(format!("refusing to run forbidden command: {cmd}"));
    }

    match mode {
        OperatingMode::Disabled => {
            PolicyDecision::refuse("command execution is currently disabled")
        }
        OperatingMode::Demo => classify_demo(cmd),
        OperatingMode::Normal => PolicyDecision::Execute,
    }
}

fn classify_demo(cmd: &str) -> PolicyDecision {
    if let Some(pattern) = DEMO_FORBIDDEN.iter().find(|re| re.is_match(cmd)) {
        tracing::info!(%cmd, pattern = pattern.as_str(), "demo mode blocked command");
        return PolicyDecision::refuse(
            "demo mode: write operations and shell-escape metacharacters are disabled",
        );
    }

    if DEMO_ALLOWED.iter().any(|re| re.is_match(cmd)) {
        tracing::debug!(%cmd, "demo mode simulating allow-listed command");
        return demo::simulate(cmd);
    }

    PolicyDecision::refuse(
        "demo mode: only safe, read-only commands are allowed; this command is not on the allow-list",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODES: [OperatingMode; 3] = [
        OperatingMode::Disabled,
        OperatingMode::Demo,
        OperatingMode::Normal,
    ];

    fn reason_of(decision: PolicyDecision) -> String {
        match decision {
            PolicyDecision::Refuse { reason } => reason,
            other => panic!("expected Refuse, got {other:?}"),
        }
    }

    // The unconditional deny-list applies regardless of mode.
    #[test]
    fn forbidden_commands_refused_in_every_mode() {
        for mode in ALL_MODES {
            for cmd in [
                "rm -rf / --no-preserve-root",
                "dd if=/dev/zero of=/dev/sda",
                "mkfs.ext4 /dev/sdb1",
                "passwd",
            ] {
                let reason = reason_of(classify(cmd, mode));
                assert!(
                    reason.contains("forbidden"),
                    "{cmd:?} in {mode} should refuse as forbidden, got {reason:?}"
                );
            }
        }
    }

    #[test]
    fn disabled_mode_refuses_everything() {
        let reason = reason_of(classify("ls", OperatingMode::Disabled));
        assert!(reason.contains("disabled"));
    }

    #[test]
    fn demo_blocks_shell_escapes() {
        for cmd in ["ls > files.txt", "ls | head", "echo `id`", "echo $(whoami)"] {
            match classify(cmd, OperatingMode::Demo) {
                PolicyDecision::Refuse { .. } => {}
                other => panic!("{cmd:?} should refuse in demo mode, got {other:?}"),
            }
        }
    }

    #[test]
    fn demo_simulates_allow_listed_commands() {
        for cmd in ["ls", "pwd", "whoami", "date"] {
            match classify(cmd, OperatingMode::Demo) {
                PolicyDecision::Simulate { stdout, .. } => {
                    assert!(!stdout.is_empty(), "{cmd:?} should have synthetic output")
                }
                other => panic!("{cmd:?} should simulate in demo mode, got {other:?}"),
            }
        }
    }

    #[test]
    fn demo_refuses_unlisted_commands() {
        let reason = reason_of(classify("curl https://example.com", OperatingMode::Demo));
        assert!(reason.contains("not on the allow-list"));
    }

    // Deny-list evaluation precedes allow-list evaluation: a command whose
    // shape is allow-listed but contains a blocked metacharacter refuses.
    #[test]
    fn demo_deny_list_precedes_allow_list() {
        match classify("grep `id` notes.txt", OperatingMode::Demo) {
            PolicyDecision::Refuse { .. } => {}
            other => panic!("backtick should win over the grep allow shape, got {other:?}"),
        }
    }

    #[test]
    fn normal_mode_executes_everything_else() {
        assert_eq!(classify("ls -la", OperatingMode::Normal), PolicyDecision::Execute);
        assert_eq!(
            classify("rm -rf ./build", OperatingMode::Normal),
            PolicyDecision::Execute
        );
    }

    #[test]
    fn classification_trims_surrounding_whitespace() {
        match classify("  pwd  ", OperatingMode::Demo) {
            PolicyDecision::Simulate { stdout, .. } => {
                assert_eq!(stdout, "/home/demo-user/demo-workspace")
            }
            other => panic!("trimmed pwd should simulate, got {other:?}"),
        }
    }
}
