// ABOUTME: stands in for the shell when no real execution is wanted, returning canned output.
// ABOUTME: keeps demo sessions deterministic apart from simulated latency.

use async_trait::async_trait;
use chrono::Local;
use nlterm_common::{ExecOutcome, ShellType};
use rand::Rng;

use super::CommandExecutor;
use crate::delay::DelayRange;
use crate::error::EngineError;

const CANNED_KEYS: &[&str] = &[
    "ls -la",
    "pwd",
    "whoami",
    "date",
    "df -h",
    "free -h",
    "ps aux | head -20",
    "git status",
    "ping -c 4 google.com",
    "clear",
    "uname -a",
    "cal",
];

#[derive(Debug, Clone)]
pub struct MockExecutor {
    delay: DelayRange,
}

impl MockExecutor {
    pub fn new(delay: DelayRange) -> Self {
        Self { delay }
    }

    pub fn instant() -> Self {
        Self::new(DelayRange::NONE)
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new(DelayRange(300, 800))
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, command: &str, _shell: ShellType) -> Result<ExecOutcome, EngineError> {
        self.delay.sleep().await;
        let output = mock_output(command);
        let execution_time_ms = rand::thread_rng().gen_range(10..110);
        let success = !output.starts_with("Error:");
        Ok(ExecOutcome {
            success,
            output,
            stderr: None,
            execution_time_ms,
            exit_code: Some(if success { 0 } else { 1 }),
        })
    }
}

/// Canned output for `command`: the first table key whose leading word
/// appears anywhere in the command wins.
pub fn mock_output(command: &str) -> String {
    for key in CANNED_KEYS {
        let first_word = key.split(' ').next().unwrap_or(key);
        if command.contains(first_word) {
            return canned(key);
        }
    }
    format!("Command executed: {command}\n[Output would appear here in a real terminal]")
}

fn canned(key: &str) -> String {
    match key {
        "ls -la" => "total 48
drwxr-xr-x  12 user  staff   384 Jan 24 10:30 .
drwxr-xr-x   5 user  staff   160 Jan 24 09:15 ..
-rw-r--r--   1 user  staff   220 Jan 24 10:30 .gitignore
drwxr-xr-x   8 user  staff   256 Jan 24 10:28 .git
-rw-r--r--   1 user  staff  1234 Jan 24 10:25 README.md
drwxr-xr-x  10 user  staff   320 Jan 24 10:30 src
-rw-r--r--   1 user  staff   567 Jan 24 10:20 package.json
drwxr-xr-x   5 user  staff   160 Jan 24 10:15 node_modules"
            .to_string(),
        "pwd" => "/home/user/projects/ai-terminal".to_string(),
        "whoami" => "user".to_string(),
        "date" => Local::now().format("%a %b %e %H:%M:%S %Z %Y").to_string(),
        "df -h" => "Filesystem      Size   Used  Avail Capacity  Mounted on
/dev/disk1s1   466Gi  234Gi  220Gi    52%    /
/dev/disk1s2   466Gi   12Gi  220Gi     6%    /System/Volumes/Data"
            .to_string(),
        "free -h" => "              total        used        free      shared  buff/cache   available
Mem:           16Gi       8.2Gi       2.1Gi       512Mi       5.7Gi       7.1Gi
Swap:         2.0Gi       256Mi       1.8Gi"
            .to_string(),
        "ps aux | head -20" => "USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND
root         1  0.0  0.1 169936 13256 ?        Ss   09:00   0:02 /sbin/init
root         2  0.0  0.0      0     0 ?        S    09:00   0:00 [kthreadd]
user      1234  2.5  1.2 456789 98765 pts/0   Sl   09:15   1:23 node server.js
user      2345  0.5  0.8 234567 65432 pts/1   S    09:20   0:45 vim README.md"
            .to_string(),
        "git status" => "On branch main
Your branch is up to date with 'origin/main'.

Changes not staged for commit:
  (use \"git add <file>...\" to update what will be committed)
        modified:   src/App.tsx
        modified:   src/index.css

Untracked files:
  (use \"git add <file>...\" to include in what will be committed)
        src/components/NewFeature.tsx

no changes added to commit"
            .to_string(),
        "ping -c 4 google.com" => "PING google.com (142.250.185.78): 56 data bytes
64 bytes from 142.250.185.78: icmp_seq=0 ttl=117 time=12.3 ms
64 bytes from 142.250.185.78: icmp_seq=1 ttl=117 time=11.8 ms
64 bytes from 142.250.185.78: icmp_seq=2 ttl=117 time=12.1 ms
64 bytes from 142.250.185.78: icmp_seq=3 ttl=117 time=11.9 ms

--- google.com ping statistics ---
4 packets transmitted, 4 packets received, 0.0% packet loss
round-trip min/avg/max/stddev = 11.8/12.0/12.3/0.2 ms"
            .to_string(),
        "uname -a" => "Linux ai-terminal 5.15.0-generic #1 SMP x86_64 GNU/Linux".to_string(),
        "cal" => "    January 2025
Su Mo Tu We Th Fr Sa
          1  2  3  4
 5  6  7  8  9 10 11
12 13 14 15 16 17 18
19 20 21 22 23 24 25
26 27 28 29 30 31"
            .to_string(),
        _ => String::new(),
    }
}
