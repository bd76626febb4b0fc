// ABOUTME: provides nlsh helpers for parsing interactive input and rendering session results.
// ABOUTME: keeps the interactive loop thin so its behavior can be tested without a terminal.

use std::path::{Path, PathBuf};

use anyhow::Context;
use nlterm_common::{
    HistoryEntry, HistoryStatus, SafetyVerdict, Settings, SettingsPatch, ShellType, Translation,
};
use nlterm_engine::config::{self, Config};
use nlterm_engine::redact::sanitize_for_display;
use nlterm_engine::{export, Session};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Submit(String),
    RunBuffer,
    Up,
    Down,
    History,
    Search(String),
    Suggest(String),
    Clear,
    Export(Option<String>),
    Set(SettingsPatch),
    Settings,
    Help,
    Quit,
    Nothing,
}

pub const HELP: &str = "\
type a request in plain words, e.g. \"show disk space\"
  :up / :down        recall older / newer requests into the buffer
  :run               submit the recalled buffer
  :history           list this session's history
  :search <text>     filter history by request or command
  :suggest <text>    show matching phrases
  :clear             forget the history
  :export [dir]      write terminal-history-<date>.json
  :set <key>=<value> change a setting (e.g. safety_level=strict)
  :settings          show current settings
  :quit              leave";

pub fn parse_repl_line(line: &str) -> anyhow::Result<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Nothing);
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Ok(ReplCommand::Submit(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "up" => ReplCommand::Up,
        "down" => ReplCommand::Down,
        "run" => ReplCommand::RunBuffer,
        "history" => ReplCommand::History,
        "search" => ReplCommand::Search(arg.to_string()),
        "suggest" => ReplCommand::Suggest(arg.to_string()),
        "clear" => ReplCommand::Clear,
        "export" => ReplCommand::Export((!arg.is_empty()).then(|| arg.to_string())),
        "set" => ReplCommand::Set(parse_setting(arg)?),
        "settings" => ReplCommand::Settings,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(anyhow::anyhow!("unknown command :{other} (try :help)")),
    };
    Ok(command)
}

pub fn parse_setting(assignment: &str) -> anyhow::Result<SettingsPatch> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected <key>=<value>"))?;
    let (key, value) = (key.trim(), value.trim());

    let mut patch = SettingsPatch::default();
    match key {
        "shell_type" => patch.shell_type = Some(value.parse().map_err(anyhow::Error::msg)?),
        "safety_level" => patch.safety_level = Some(value.parse().map_err(anyhow::Error::msg)?),
        "theme" => patch.theme = Some(value.parse().map_err(anyhow::Error::msg)?),
        "font_size" => patch.font_size = Some(value.parse()?),
        "show_ai_panel" => patch.show_ai_panel = Some(value.parse()?),
        "show_suggestions" => patch.show_suggestions = Some(value.parse()?),
        "sound_effects" => patch.sound_effects = Some(value.parse()?),
        "auto_execute_safe" => patch.auto_execute_safe = Some(value.parse()?),
        other => return Err(anyhow::anyhow!("unknown setting {other:?}")),
    }
    Ok(patch)
}

pub fn render_entry(entry: &HistoryEntry, show_explanation: bool) -> String {
    let marker = match entry.status {
        HistoryStatus::Success => "ok",
        HistoryStatus::Error => "error",
        HistoryStatus::Blocked => "blocked",
        HistoryStatus::Pending => "pending",
    };

    let mut out = format!("> {}\n", sanitize_for_display(&entry.natural_language));
    if !entry.shell_command.is_empty() {
        out.push_str(&format!("$ {}\n", sanitize_for_display(&entry.shell_command)));
    }
    if !entry.output.is_empty() {
        out.push_str(entry.output.trim_end());
        out.push('\n');
    }
    match entry.execution_time {
        Some(ms) => out.push_str(&format!("[{marker} in {ms}ms]")),
        None => out.push_str(&format!("[{marker}]")),
    }
    if show_explanation {
        if let Some(explanation) = &entry.ai_explanation {
            out.push_str(&format!("\n  {explanation}"));
        }
    }
    out
}

pub fn render_translation(t: &Translation) -> String {
    let mut out = format!(
        "$ {}\n  {}\n  confidence {:.2}, risk {}",
        sanitize_for_display(&t.shell_command),
        t.explanation,
        t.confidence,
        t.safety_check.risk_level
    );
    if let Some(alternatives) = &t.alternatives {
        if !alternatives.is_empty() {
            out.push_str(&format!("\n  alternatives: {}", alternatives.join(", ")));
        }
    }
    out.push_str(&render_verdict_notes(&t.safety_check));
    out
}

fn render_verdict_notes(v: &SafetyVerdict) -> String {
    let mut out = String::new();
    for reason in &v.blocked_patterns {
        out.push_str(&format!("\n  blocked: {reason}"));
    }
    for warning in &v.warnings {
        out.push_str(&format!("\n  warning: {warning}"));
    }
    out
}

pub fn render_settings(s: &Settings) -> String {
    format!(
        "shell_type={} safety_level={} theme={} font_size={} show_ai_panel={} show_suggestions={} sound_effects={} auto_execute_safe={}",
        s.shell_type,
        s.safety_level,
        s.theme,
        s.font_size,
        s.show_ai_panel,
        s.show_suggestions,
        s.sound_effects,
        s.auto_execute_safe
    )
}

/// Writes the session history into `dir` and returns the file written.
pub async fn export_session(session: &Session, dir: &Path) -> anyhow::Result<PathBuf> {
    let entries = session.history();
    let path = export::write_export(dir, &entries).await?;
    info!(path = %path.display(), entries = entries.len(), "history exported");
    Ok(path)
}

/// Writes a default config for the detected shell; refuses to overwrite.
pub fn init_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        return Err(anyhow::anyhow!("{} already exists", path.display()));
    }
    let mut fresh = Config::default();
    fresh.settings.shell_type = ShellType::detect();
    config::save_config(path, &fresh)
        .with_context(|| format!("write config to {}", path.display()))?;
    info!(path = %path.display(), "config initialized");
    Ok(fresh)
}
