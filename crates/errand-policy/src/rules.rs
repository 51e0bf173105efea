//! Pattern tables for the policy classifier.
//!
//! Three fixed sets, compiled once: the unconditional deny-list applied in
//! every mode, the demo-mode deny-list, and the demo-mode read-only
//! allow-list. First match in iteration order wins; there is no attempt to
//! find a "best" match.

use std::sync::LazyLock;

use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("built-in policy pattern must compile"))
        .collect()
}

/// Catastrophic operations refused in every mode, before any mode-specific
/// logic. Not configurable.
pub static FORBIDDEN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        // recursive root deletion with the preserve-root guard disabled
        r"(?i)\brm\s+-rf?\s+/\s*--no-preserve-root\b",
        // raw disk writes via dd
        r"(?i)\bdd\s+if=.*\s+of=/dev/(sda|nvme|hda)[0-9]*",
        // formatting a block device
        r"(?i)\bmkfs(\.\w+)?\s+/dev/[a-z0-9]+",
        // password changes
        r"(?i)\bpasswd\b",
    ])
});

/// Write, escalation, and shell-escape operations blocked in demo mode.
///
/// Checked before the allow-list, so a command matching both is refused.
pub static DEMO_FORBIDDEN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        // destructive or permission-changing file operations
        r"(?i)\b(rm|rmdir|mv|cp|mkdir|touch|chmod|chown|sudo|su|passwd|useradd|userdel|groupadd|groupdel)\b",
        // package managers
        r"(?i)\b(apt|yum|dnf|pacman|pip|npm|yarn|cargo|go\s+install)\b",
        // service, mount, and disk management
        r"(?i)\b(systemctl|service|mount|umount|fdisk|parted|mkfs|dd)\b",
        // git history mutation
        r"(?i)\bgit\s+(commit|push|clone|pull)\b",
        // output redirection
        r">",
        // pipes
        r"\|",
        // variable expansion
        r"\$\{.*\}",
        // command substitution
        r"\$\(",
        // backticks
        r"`",
        // environment mutation
        r"(?i)\bexport\s+",
        // sourcing
        r"(?i)\bsource\s+",
        // dot sourcing at a command position
        r"(^|;)\s*\.\s",
    ])
});

/// Literal read-only command shapes that demo mode simulates.
pub static DEMO_ALLOWED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"^ls\b",
        r"^pwd$",
        r"^whoami$",
        r"^date$",
        // echo without variable expansion
        r"^echo\s+[^$]*$",
        r"^cat\s+/etc/os-release$",
        r"^uname\s+-a$",
        r"^uptime$",
        r"^df\s+-h$",
        r"^free\s+-h$",
        r"^ps\s+aux$",
        r"^which\s+\w+$",
        r"^find\s+.*-type\s+f.*-name.*$",
        r"^grep\s+.*$",
        r"^head\s+.*$",
        r"^tail\s+.*$",
        r"^wc\s+.*$",
        r"^sort\s+.*$",
        r"^uniq\s+.*$",
    ])
});
