// ABOUTME: holds the fixed catalog of dangerous and warning command shapes.
// ABOUTME: rules are ordered and every rule is checked so all reasons get reported.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    RootRecursiveDelete,
    WildcardRecursiveDelete,
    SudoRemove,
    ForkBomb,
    FormatFilesystem,
    DirectDiskWrite,
    OverwriteDisk,
    RecursiveChmodRoot,
    CurlPipeBash,
    WgetPipeShell,
    Shutdown,
    Reboot,
    Halt,
    Sudo,
    RecursiveDelete,
    Chmod,
    Chown,
    ForceKill,
    ProcessKill,
    MoveToSystemDir,
}

#[derive(Debug)]
pub struct PatternRule {
    pub id: RuleId,
    pub pattern: Regex,
    pub description: &'static str,
}

impl PatternRule {
    pub fn matches(&self, command: &str) -> bool {
        self.pattern.is_match(command)
    }
}

fn rule(id: RuleId, pattern: &str, description: &'static str) -> PatternRule {
    PatternRule {
        id,
        pattern: Regex::new(pattern).expect("Invalid pattern rule regex"),
        description,
    }
}

pub static DANGEROUS_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(RuleId::RootRecursiveDelete, r"rm\s+-rf\s+/", "Recursive force delete from root"),
        rule(RuleId::WildcardRecursiveDelete, r"rm\s+-rf\s+\*", "Recursive force delete all"),
        rule(RuleId::SudoRemove, r"sudo\s+rm", "Sudo remove command"),
        rule(RuleId::ForkBomb, r":\(\)\{\s*:\|:&\s*\};:", "Fork bomb"),
        rule(RuleId::FormatFilesystem, r"mkfs\.", "Format filesystem"),
        rule(RuleId::DirectDiskWrite, r"dd\s+if=.*of=/dev/", "Direct disk write"),
        rule(RuleId::OverwriteDisk, r">\s*/dev/sda", "Overwrite disk"),
        rule(RuleId::RecursiveChmodRoot, r"chmod\s+-R\s+777\s+/", "Dangerous permissions change"),
        rule(RuleId::CurlPipeBash, r"curl.*\|\s*bash", "Pipe curl to bash"),
        rule(RuleId::WgetPipeShell, r"wget.*\|\s*sh", "Pipe wget to shell"),
        rule(RuleId::Shutdown, r"shutdown", "System shutdown"),
        rule(RuleId::Reboot, r"reboot", "System reboot"),
        rule(RuleId::Halt, r"init\s+0", "System halt"),
    ]
});

pub static WARNING_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(RuleId::Sudo, r"sudo", "Elevated privileges required"),
        rule(RuleId::RecursiveDelete, r"rm\s+-r", "Recursive deletion"),
        rule(RuleId::Chmod, r"chmod", "Permission modification"),
        rule(RuleId::Chown, r"chown", "Ownership modification"),
        rule(RuleId::ForceKill, r"kill\s+-9", "Force kill process"),
        rule(RuleId::ProcessKill, r"pkill", "Process termination"),
        rule(RuleId::MoveToSystemDir, r"mv\s+.*/", "Moving files to system directory"),
    ]
});

/// Every rule in `rules` that matches, in catalog order.
pub fn matching<'a>(rules: &'a [PatternRule], command: &str) -> Vec<&'a PatternRule> {
    rules.iter().filter(|r| r.matches(command)).collect()
}
