//! Synthesized responses for demo-mode commands.
//!
//! Allow-listed commands never touch the host; they get a canned or
//! templated response instead so the agent loop sees a plausible shell.

use errand_types::PolicyDecision;

const DEMO_LISTING: &str = "demo_file1.txt\ndemo_file2.txt\ndemo_folder/\nREADME.md\npackage.json";

const DEMO_OS_RELEASE: &str = "NAME=\"Demo Linux\"\nVERSION=\"1.0 (Demo Edition)\"\nID=demo\nID_LIKE=debian\nPRETTY_NAME=\"Demo Linux 1.0\"\nVERSION_ID=\"1.0\"\nHOME_URL=\"https://demo.example.com/\"\nSUPPORT_URL=\"https://demo.example.com/support\"";

const DEMO_DF: &str = "Filesystem      Size  Used Avail Use% Mounted on\n/dev/sda1        20G  8.5G   11G  45% /\ntmpfs           2.0G     0  2.0G   0% /tmp";

const DEMO_FREE: &str = "               total        used        free      shared  buff/cache   available\nMem:           7.8Gi       2.1Gi       4.2Gi       0.3Gi       1.5Gi       5.1Gi\nSwap:          2.0Gi          0B       2.0Gi";

const DEMO_PS: &str = "USER         PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND\ndemo-user   1234  0.1  0.5  12345  6789 pts/0    S    14:30   0:00 bash\ndemo-user   5678  0.0  0.2   8901  2345 pts/0    R    14:32   0:00 ps aux";

/// Build the simulated response for an allow-listed demo command.
///
/// The command is normalized (trimmed, lowercased) before matching, same
/// as the allow-list shapes assume.
pub fn simulate(cmd: &str) -> PolicyDecision {
    let cmd = cmd.trim().to_lowercase();

    let stdout = if cmd == "ls" || cmd.starts_with("ls ") {
        DEMO_LISTING.to_string()
    } else if cmd == "pwd" {
        "/home/demo-user/demo-workspace".to_string()
    } else if cmd == "whoami" {
        "demo-user".to_string()
    } else if cmd == "date" {
        chrono::Local::now().format("%a %b %e %H:%M:%S %Z %Y").to_string()
    } else if cmd == "uname -a" {
        "Linux demo-machine 5.15.0-demo #1 SMP PREEMPT Demo x86_64 GNU/Linux".to_string()
    } else if cmd == "uptime" {
        "14:32:01 up 2 days, 3:21, 1 user, load average: 0.15, 0.25, 0.30".to_string()
    } else if cmd == "df -h" {
        DEMO_DF.to_string()
    } else if cmd == "free -h" {
        DEMO_FREE.to_string()
    } else if cmd == "ps aux" {
        DEMO_PS.to_string()
    } else if cmd.starts_with("cat /etc/os-release") {
        DEMO_OS_RELEASE.to_string()
    } else if let Some(text) = cmd.strip_prefix("echo ") {
        text.to_string()
    } else if cmd.starts_with("find ") {
        "./demo_file1.txt\n./demo_folder/demo_file2.txt\n./README.md".to_string()
    } else {
        format!("[demo] command {cmd:?} executed successfully (simulated response)")
    };

    PolicyDecision::simulate(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stdout_of(decision: PolicyDecision) -> String {
        match decision {
            PolicyDecision::Simulate { stdout, .. } => stdout,
            other => panic!("expected Simulate, got {other:?}"),
        }
    }

    #[test]
    fn ls_yields_fixed_listing() {
        assert_eq!(stdout_of(simulate("ls")), DEMO_LISTING);
        assert_eq!(stdout_of(simulate("ls -la")), DEMO_LISTING);
    }

    #[test]
    fn pwd_and_whoami_are_deterministic() {
        assert_eq!(stdout_of(simulate("pwd")), "/home/demo-user/demo-workspace");
        assert_eq!(stdout_of(simulate("whoami")), "demo-user");
    }

    #[test]
    fn echo_passes_text_through() {
        assert_eq!(stdout_of(simulate("echo hello world")), "hello world");
    }

    #[test]
    fn unknown_safe_command_is_labeled_simulated() {
        let out = stdout_of(simulate("grep foo notes.txt"));
        assert!(out.contains("simulated"), "fallback output should be clearly labeled: {out}");
    }

    #[test]
    fn date_is_nonempty() {
        assert!(!stdout_of(simulate("date")).is_empty());
    }
}
