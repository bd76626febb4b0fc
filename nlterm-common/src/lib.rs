// ABOUTME: defines the shared data model used by the nlterm engine and the nlsh front end.
// ABOUTME: provides history export helpers so persisted artifacts stay stable across versions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    Strict,
    #[default]
    Moderate,
    Permissive,
}

impl SafetyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLevel::Strict => "strict",
            SafetyLevel::Moderate => "moderate",
            SafetyLevel::Permissive => "permissive",
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafetyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SafetyLevel::Strict),
            "moderate" => Ok(SafetyLevel::Moderate),
            "permissive" => Ok(SafetyLevel::Permissive),
            other => Err(format!(
                "unknown safety level {other:?} (expected strict, moderate or permissive)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Warning => "warning",
            RiskLevel::Danger => "danger",
        };
        f.write_str(s)
    }
}

/// Outcome of checking one command against the pattern catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SafetyVerdict {
    pub is_safe: bool,
    pub risk_level: RiskLevel,
    pub blocked_patterns: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub original_query: String,
    pub shell_command: String,
    pub explanation: String,
    /// Not clamped: fuzzy matches with many overlapping words can exceed 1.0.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,
    pub safety_check: SafetyVerdict,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Pending,
    Success,
    Error,
    Blocked,
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HistoryStatus::Pending => "pending",
            HistoryStatus::Success => "success",
            HistoryStatus::Error => "error",
            HistoryStatus::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

/// One submitted request and its outcome. Entries are built once and then
/// only ever appended to a history log.
/// Field names follow the exported `terminal-history-<date>.json` files.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub natural_language: String,
    pub shell_command: String,
    pub output: String,
    pub status: HistoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_explanation: Option<String>,
    /// Milliseconds; absent for blocked and failed-before-execution entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<u64>,
}

impl HistoryEntry {
    pub fn new(
        natural_language: impl Into<String>,
        shell_command: impl Into<String>,
        output: impl Into<String>,
        status: HistoryStatus,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            natural_language: natural_language.into(),
            shell_command: shell_command.into(),
            output: output.into(),
            status,
            ai_explanation: None,
            execution_time: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.ai_explanation = Some(explanation.into());
        self
    }

    pub fn with_execution_time(mut self, millis: u64) -> Self {
        self.execution_time = Some(millis);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShellType {
    #[default]
    Bash,
    Zsh,
    Powershell,
    Cmd,
}

impl ShellType {
    /// Picks the user's login shell, falling back to bash.
    pub fn detect() -> Self {
        if cfg!(windows) {
            return match std::env::var("COMSPEC") {
                Ok(comspec) if comspec.to_ascii_lowercase().contains("powershell") => {
                    ShellType::Powershell
                }
                _ => ShellType::Cmd,
            };
        }

        match std::env::var("SHELL") {
            Ok(shell) if shell.ends_with("zsh") => ShellType::Zsh,
            _ => ShellType::Bash,
        }
    }

    /// Program and the flag that makes it run a single command string.
    pub fn invocation(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            ShellType::Bash => ("bash", &["-c"]),
            ShellType::Zsh => ("zsh", &["-c"]),
            ShellType::Powershell => ("powershell", &["-NoProfile", "-Command"]),
            ShellType::Cmd => ("cmd", &["/C"]),
        }
    }
}

impl fmt::Display for ShellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShellType::Bash => "bash",
            ShellType::Zsh => "zsh",
            ShellType::Powershell => "powershell",
            ShellType::Cmd => "cmd",
        };
        f.write_str(s)
    }
}

impl FromStr for ShellType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bash" => Ok(ShellType::Bash),
            "zsh" => Ok(ShellType::Zsh),
            "powershell" => Ok(ShellType::Powershell),
            "cmd" => Ok(ShellType::Cmd),
            other => Err(format!("unknown shell type {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Darker,
    Midnight,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Theme::Dark => "dark",
            Theme::Darker => "darker",
            Theme::Midnight => "midnight",
        };
        f.write_str(s)
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "darker" => Ok(Theme::Darker),
            "midnight" => Ok(Theme::Midnight),
            other => Err(format!("unknown theme {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub shell_type: ShellType,
    pub safety_level: SafetyLevel,
    pub theme: Theme,
    pub font_size: u16,
    pub show_ai_panel: bool,
    pub show_suggestions: bool,
    pub sound_effects: bool,
    pub auto_execute_safe: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shell_type: ShellType::Bash,
            safety_level: SafetyLevel::Moderate,
            theme: Theme::Dark,
            font_size: 14,
            show_ai_panel: true,
            show_suggestions: true,
            sound_effects: false,
            auto_execute_safe: false,
        }
    }
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.shell_type {
            self.shell_type = v;
        }
        if let Some(v) = patch.safety_level {
            self.safety_level = v;
        }
        if let Some(v) = patch.theme {
            self.theme = v;
        }
        if let Some(v) = patch.font_size {
            self.font_size = v;
        }
        if let Some(v) = patch.show_ai_panel {
            self.show_ai_panel = v;
        }
        if let Some(v) = patch.show_suggestions {
            self.show_suggestions = v;
        }
        if let Some(v) = patch.sound_effects {
            self.sound_effects = v;
        }
        if let Some(v) = patch.auto_execute_safe {
            self.auto_execute_safe = v;
        }
    }
}

/// Partial update for [`Settings`]; only the fields that are set get applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsPatch {
    pub shell_type: Option<ShellType>,
    pub safety_level: Option<SafetyLevel>,
    pub theme: Option<Theme>,
    pub font_size: Option<u16>,
    pub show_ai_panel: Option<bool>,
    pub show_suggestions: Option<bool>,
    pub sound_effects: Option<bool>,
    pub auto_execute_safe: Option<bool>,
}

/// What an executor reports back for one command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecOutcome {
    pub success: bool,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    pub execution_time_ms: u64,
    pub exit_code: Option<i32>,
}

impl ExecOutcome {
    /// Text shown to the user: stdout on success, otherwise stderr when the
    /// command wrote any.
    pub fn display_output(&self) -> &str {
        if self.success {
            return &self.output;
        }
        match self.stderr.as_deref() {
            Some(stderr) if !stderr.is_empty() => stderr,
            _ => &self.output,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionCategory {
    Recent,
    Frequent,
    AiSuggested,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Suggestion {
    pub id: String,
    pub command: String,
    pub description: String,
    pub frequency: u32,
    pub category: SuggestionCategory,
}

pub fn export_history_json(entries: &[HistoryEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

pub fn parse_history_json(input: &str) -> Result<Vec<HistoryEntry>, serde_json::Error> {
    serde_json::from_str(input)
}
