// ABOUTME: sequences translation, the safety gate, execution and explanation for one session.
// ABOUTME: owns the append-only history, the recall cursor and the input buffer.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nlterm_common::{
    HistoryEntry, HistoryStatus, SafetyVerdict, Settings, SettingsPatch, Suggestion, Translation,
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::actions::exec::ShellExecutor;
use crate::actions::mock::MockExecutor;
use crate::actions::CommandExecutor;
use crate::config::Config;
use crate::delay::DelayRange;
use crate::error::EngineError;
use crate::explain::{OutputExplainer, TemplateExplainer};
use crate::journal;
use crate::suggest;
use crate::translate::{CommandTranslator, PhraseTranslator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Translating,
    Executing,
    Explaining,
}

#[derive(Debug, Default)]
struct Recall {
    // None means the user is not browsing history.
    cursor: Option<usize>,
    input: String,
}

pub struct Session {
    translator: Arc<dyn CommandTranslator>,
    executor: Arc<dyn CommandExecutor>,
    explainer: Arc<dyn OutputExplainer>,
    settings: Mutex<Settings>,
    history: Mutex<Vec<HistoryEntry>>,
    recall: Mutex<Recall>,
    current: Mutex<Option<Translation>>,
    processing: AtomicBool,
    phase: watch::Sender<Phase>,
    journal_path: Option<PathBuf>,
}

impl Session {
    pub fn new(
        translator: Arc<dyn CommandTranslator>,
        executor: Arc<dyn CommandExecutor>,
        explainer: Arc<dyn OutputExplainer>,
        settings: Settings,
    ) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            translator,
            executor,
            explainer,
            settings: Mutex::new(settings),
            history: Mutex::new(Vec::new()),
            recall: Mutex::new(Recall::default()),
            current: Mutex::new(None),
            processing: AtomicBool::new(false),
            phase,
            journal_path: None,
        }
    }

    /// Builds a session from config; `mock` swaps the shell for canned output.
    pub fn from_config(config: &Config, mock: bool) -> Self {
        let engine = &config.engine;
        let executor: Arc<dyn CommandExecutor> = if mock {
            Arc::new(MockExecutor::new(engine.mock_exec_delay_ms))
        } else {
            Arc::new(ShellExecutor::new(engine.exec_timeout(), engine.max_output_bytes))
        };
        let mut session = Self::new(
            Arc::new(PhraseTranslator::new(engine.translate_delay_ms)),
            executor,
            Arc::new(TemplateExplainer::new(DelayRange::fixed(engine.explain_delay_ms))),
            config.settings.clone(),
        );
        session.journal_path = engine.journal_path.clone();
        session
    }

    pub fn with_journal(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_path = Some(path.into());
        self
    }

    /// Processes one request end to end and returns the entry it appended.
    /// Empty input and submissions made while busy are rejected untouched.
    pub async fn submit(&self, input: &str) -> Result<HistoryEntry, EngineError> {
        if input.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }
        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::Busy);
        }
        let _guard = ProcessingGuard { session: self };

        {
            let mut recall = lock(&self.recall);
            recall.input.clear();
            recall.cursor = None;
        }

        let entry = match self.process(input).await {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "submission failed");
                HistoryEntry::new(input, "", format!("Error: {err}"), HistoryStatus::Error)
            }
        };

        lock(&self.history).push(entry.clone());
        info!(id = %entry.id, status = %entry.status, "history entry appended");

        if let Some(path) = &self.journal_path {
            if let Err(err) = journal::append_entry(path, &entry).await {
                warn!(error = %err, "journal append failed");
            }
        }

        Ok(entry)
    }

    async fn process(&self, input: &str) -> Result<HistoryEntry, EngineError> {
        let settings = self.settings();

        self.phase.send_replace(Phase::Translating);
        let translation = self.translator.translate(input, settings.safety_level).await?;
        *lock(&self.current) = Some(translation.clone());

        if !translation.safety_check.is_safe {
            warn!(command = %translation.shell_command, "command blocked by safety policy");
            return Ok(HistoryEntry::new(
                input,
                translation.shell_command.as_str(),
                blocked_output(&translation.safety_check),
                HistoryStatus::Blocked,
            )
            .with_explanation(translation.explanation));
        }

        self.phase.send_replace(Phase::Executing);
        info!(command = %translation.shell_command, "executing");
        let outcome = self
            .executor
            .execute(&translation.shell_command, settings.shell_type)
            .await?;
        let is_error = !outcome.success;
        let output = outcome.display_output().to_string();

        self.phase.send_replace(Phase::Explaining);
        let explanation = self
            .explainer
            .explain(&translation.shell_command, &output, is_error)
            .await?;

        let status = if is_error {
            HistoryStatus::Error
        } else {
            HistoryStatus::Success
        };
        Ok(
            HistoryEntry::new(input, translation.shell_command, output, status)
                .with_explanation(explanation)
                .with_execution_time(outcome.execution_time_ms),
        )
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// The translation of the request currently in flight, if any.
    pub fn current_translation(&self) -> Option<Translation> {
        lock(&self.current).clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        lock(&self.history).clone()
    }

    /// Entries whose request or command contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<HistoryEntry> {
        let needle = query.to_lowercase();
        lock(&self.history)
            .iter()
            .filter(|e| {
                needle.is_empty()
                    || e.natural_language.to_lowercase().contains(&needle)
                    || e.shell_command.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.history).clear();
        *lock(&self.recall) = Recall::default();
        *lock(&self.current) = None;
    }

    pub fn input(&self) -> String {
        lock(&self.recall).input.clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        lock(&self.recall).input = text.into();
    }

    pub fn recall_cursor(&self) -> Option<usize> {
        lock(&self.recall).cursor
    }

    /// Steps back to an older request and loads it into the input buffer.
    /// Pinned at the oldest entry; a no-op on empty history.
    pub fn history_up(&self) -> Option<String> {
        let history = lock(&self.history);
        if history.is_empty() {
            return None;
        }
        let mut recall = lock(&self.recall);
        let next = match recall.cursor {
            None => 0,
            Some(c) if c + 1 < history.len() => c + 1,
            Some(c) => c.min(history.len() - 1),
        };
        recall.cursor = Some(next);
        recall.input = history[history.len() - 1 - next].natural_language.clone();
        Some(recall.input.clone())
    }

    /// Steps toward the newest request; stepping past it clears the input.
    pub fn history_down(&self) -> Option<String> {
        let history = lock(&self.history);
        if history.is_empty() {
            return None;
        }
        let mut recall = lock(&self.recall);
        recall.cursor = match recall.cursor {
            Some(c) if c > 0 => Some(c - 1),
            _ => None,
        };
        recall.input = match recall.cursor {
            Some(c) => history[history.len() - 1 - c].natural_language.clone(),
            None => String::new(),
        };
        Some(recall.input.clone())
    }

    pub fn settings(&self) -> Settings {
        lock(&self.settings).clone()
    }

    pub fn update_settings(&self, patch: SettingsPatch) -> Settings {
        let mut settings = lock(&self.settings);
        settings.apply(patch);
        info!(safety_level = %settings.safety_level, "settings updated");
        settings.clone()
    }

    pub fn suggestions(&self, input: &str) -> Vec<Suggestion> {
        if !self.settings().show_suggestions {
            return Vec::new();
        }
        suggest::suggestion_records(input)
    }
}

/// Restores the idle state however a submission ends.
struct ProcessingGuard<'a> {
    session: &'a Session,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        *lock(&self.session.current) = None;
        self.session.phase.send_replace(Phase::Idle);
        self.session.processing.store(false, Ordering::SeqCst);
    }
}

fn blocked_output(verdict: &SafetyVerdict) -> String {
    // Strict mode blocks on warnings alone, in which case those are the reasons.
    let reasons = if verdict.blocked_patterns.is_empty() {
        &verdict.warnings
    } else {
        &verdict.blocked_patterns
    };
    format!(
        "Command blocked for safety:\n{}\n\nSuggestions:\n{}",
        reasons.join("\n"),
        verdict.suggestions.join("\n")
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use nlterm_common::{ExecOutcome, SafetyLevel, ShellType};
    use tokio::sync::Semaphore;

    use crate::policy;

    struct FixedTranslator(&'static str);

    #[async_trait]
    impl CommandTranslator for FixedTranslator {
        async fn translate(
            &self,
            text: &str,
            level: SafetyLevel,
        ) -> Result<Translation, EngineError> {
            Ok(Translation {
                original_query: text.to_string(),
                shell_command: self.0.to_string(),
                explanation: "fixed".to_string(),
                confidence: 0.95,
                alternatives: None,
                safety_check: policy::validate(self.0, level),
            })
        }
    }

    struct BrokenTranslator;

    #[async_trait]
    impl CommandTranslator for BrokenTranslator {
        async fn translate(
            &self,
            _text: &str,
            _level: SafetyLevel,
        ) -> Result<Translation, EngineError> {
            Err(EngineError::Translation("model offline".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingExecutor {
        calls: AtomicUsize,
        fail_with: Option<&'static str>,
        error: bool,
    }

    #[async_trait]
    impl CommandExecutor for RecordingExecutor {
        async fn execute(
            &self,
            command: &str,
            _shell: ShellType,
        ) -> Result<ExecOutcome, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(msg) = self.fail_with {
                return Err(EngineError::Execution(msg.to_string()));
            }
            Ok(ExecOutcome {
                success: !self.error,
                output: format!("ran {command}"),
                stderr: self.error.then(|| "bash: nope: command not found".to_string()),
                execution_time_ms: 7,
                exit_code: Some(if self.error { 127 } else { 0 }),
            })
        }
    }

    struct GatedExecutor {
        gate: Semaphore,
    }

    #[async_trait]
    impl CommandExecutor for GatedExecutor {
        async fn execute(
            &self,
            _command: &str,
            _shell: ShellType,
        ) -> Result<ExecOutcome, EngineError> {
            let _permit =
                self.gate.acquire().await.map_err(|e| EngineError::Execution(e.to_string()))?;
            Ok(ExecOutcome {
                success: true,
                output: "done".to_string(),
                stderr: None,
                execution_time_ms: 1,
                exit_code: Some(0),
            })
        }
    }

    struct BrokenExplainer;

    #[async_trait]
    impl OutputExplainer for BrokenExplainer {
        async fn explain(
            &self,
            _command: &str,
            _output: &str,
            _is_error: bool,
        ) -> Result<String, EngineError> {
            Err(EngineError::Execution("explainer unavailable".to_string()))
        }
    }

    fn session_with(
        translator: Arc<dyn CommandTranslator>,
        executor: Arc<dyn CommandExecutor>,
        settings: Settings,
    ) -> Session {
        Session::new(translator, executor, Arc::new(TemplateExplainer::instant()), settings)
    }

    fn catalog_session(executor: Arc<dyn CommandExecutor>) -> Session {
        session_with(Arc::new(PhraseTranslator::instant()), executor, Settings::default())
    }

    #[tokio::test]
    async fn safe_request_runs_and_is_explained() {
        let executor = Arc::new(RecordingExecutor::default());
        let session = catalog_session(executor.clone());

        let entry = session.submit("list all files").await.unwrap();
        assert_eq!(entry.status, HistoryStatus::Success);
        assert_eq!(entry.shell_command, "ls -la");
        assert_eq!(entry.output, "ran ls -la");
        assert_eq!(entry.execution_time, Some(7));
        assert_eq!(
            entry.ai_explanation.as_deref(),
            Some("Command executed successfully. The output shows the expected results.")
        );
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.history(), vec![entry]);
        assert!(!session.is_processing());
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.current_translation().is_none());
    }

    #[tokio::test]
    async fn failing_command_is_recorded_as_error() {
        let executor = Arc::new(RecordingExecutor {
            error: true,
            ..RecordingExecutor::default()
        });
        let session = catalog_session(executor);

        let entry = session.submit("git status").await.unwrap();
        assert_eq!(entry.status, HistoryStatus::Error);
        assert_eq!(entry.output, "bash: nope: command not found");
        assert!(entry.ai_explanation.unwrap().starts_with("The command or file was not found."));
        assert_eq!(entry.execution_time, Some(7));
    }

    #[tokio::test]
    async fn dangerous_command_is_blocked_without_executing() {
        let executor = Arc::new(RecordingExecutor::default());
        let session = session_with(
            Arc::new(FixedTranslator("sudo rm -rf /")),
            executor.clone(),
            Settings {
                safety_level: SafetyLevel::Permissive,
                ..Settings::default()
            },
        );

        let entry = session.submit("wipe everything").await.unwrap();
        assert_eq!(entry.status, HistoryStatus::Blocked);
        assert_eq!(entry.execution_time, None);
        assert_eq!(entry.shell_command, "sudo rm -rf /");
        assert_eq!(entry.ai_explanation.as_deref(), Some("fixed"));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);

        let first_reason = entry.output.find("Recursive force delete from root").unwrap();
        let second_reason = entry.output.find("Sudo remove command").unwrap();
        let advice = entry.output.find("Consider using safer alternatives").unwrap();
        assert!(first_reason < second_reason && second_reason < advice);
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn strict_mode_blocks_warning_commands_with_reasons() {
        let executor = Arc::new(RecordingExecutor::default());
        let session = session_with(
            Arc::new(FixedTranslator("sudo apt update")),
            executor.clone(),
            Settings::default(),
        );

        let allowed = session.submit("update packages").await.unwrap();
        assert_eq!(allowed.status, HistoryStatus::Success);

        session.update_settings(SettingsPatch {
            safety_level: Some(SafetyLevel::Strict),
            ..SettingsPatch::default()
        });
        let blocked = session.submit("update packages").await.unwrap();
        assert_eq!(blocked.status, HistoryStatus::Blocked);
        assert!(blocked.output.contains("Elevated privileges required"));
        assert!(blocked.output.contains("Strict safety mode blocks potentially risky commands."));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn executor_failure_becomes_error_entry() {
        let executor = Arc::new(RecordingExecutor {
            fail_with: Some("shell vanished"),
            ..RecordingExecutor::default()
        });
        let session = catalog_session(executor);

        let entry = session.submit("where am i").await.unwrap();
        assert_eq!(entry.status, HistoryStatus::Error);
        assert_eq!(entry.shell_command, "");
        assert_eq!(entry.output, "Error: execution failed: shell vanished");
        assert!(entry.ai_explanation.is_none());
        assert!(!session.is_processing());
        assert_eq!(session.phase(), Phase::Idle);

        let next = session.submit("where am i").await;
        assert!(next.is_ok(), "session keeps working after a failure");
    }

    #[tokio::test]
    async fn translator_failure_becomes_error_entry() {
        let session = session_with(
            Arc::new(BrokenTranslator),
            Arc::new(RecordingExecutor::default()),
            Settings::default(),
        );
        let entry = session.submit("list files").await.unwrap();
        assert_eq!(entry.status, HistoryStatus::Error);
        assert_eq!(entry.output, "Error: translation failed: model offline");
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn explainer_failure_becomes_error_entry() {
        let executor = Arc::new(RecordingExecutor::default());
        let session = Session::new(
            Arc::new(PhraseTranslator::instant()),
            executor.clone(),
            Arc::new(BrokenExplainer),
            Settings::default(),
        );

        let entry = session.submit("list files").await.unwrap();
        assert_eq!(entry.status, HistoryStatus::Error);
        assert_eq!(entry.shell_command, "");
        assert_eq!(entry.output, "Error: execution failed: explainer unavailable");
        assert!(entry.ai_explanation.is_none());
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

        assert_eq!(session.history(), vec![entry]);
        assert!(!session.is_processing());
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.current_translation().is_none());

        let next = session.submit("list files").await.unwrap();
        assert_eq!(next.status, HistoryStatus::Error);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_state_change() {
        let executor = Arc::new(RecordingExecutor::default());
        let session = catalog_session(executor.clone());
        session.set_input("draft");

        let err = session.submit("   ").await.unwrap_err();
        assert!(matches!(err, EngineError::EmptyInput));
        assert!(err.is_rejection());
        assert!(session.history().is_empty());
        assert_eq!(session.input(), "draft");
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_submission_while_busy_is_rejected() {
        let executor = Arc::new(GatedExecutor { gate: Semaphore::new(0) });
        let session = Arc::new(catalog_session(executor.clone()));

        let mut phases = session.subscribe_phase();
        let running = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("list files").await })
        };
        phases.wait_for(|p| *p == Phase::Executing).await.unwrap();

        assert!(session.is_processing());
        assert!(session.current_translation().is_some());
        let err = session.submit("show memory").await.unwrap_err();
        assert!(matches!(err, EngineError::Busy));

        executor.gate.add_permits(1);
        let entry = running.await.unwrap().unwrap();
        assert_eq!(entry.status, HistoryStatus::Success);
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn recall_walks_newest_first_and_pins_at_oldest() {
        let session = catalog_session(Arc::new(RecordingExecutor::default()));
        for request in ["list files", "show memory", "git status"] {
            session.submit(request).await.unwrap();
        }

        assert_eq!(session.history_up().as_deref(), Some("git status"));
        assert_eq!(session.history_up().as_deref(), Some("show memory"));
        assert_eq!(session.history_up().as_deref(), Some("list files"));
        assert_eq!(session.history_up().as_deref(), Some("list files"));
        assert_eq!(session.recall_cursor(), Some(2));

        assert_eq!(session.history_down().as_deref(), Some("show memory"));
        assert_eq!(session.history_down().as_deref(), Some("git status"));
        assert_eq!(session.history_down().as_deref(), Some(""));
        assert_eq!(session.recall_cursor(), None);
        assert_eq!(session.input(), "");

        session.history_up();
        session.submit("calendar").await.unwrap();
        assert_eq!(session.recall_cursor(), None);
        assert_eq!(session.input(), "");
    }

    #[tokio::test]
    async fn clear_is_idempotent_and_resets_recall() {
        let session = catalog_session(Arc::new(RecordingExecutor::default()));
        session.clear();
        assert!(session.history().is_empty());

        session.submit("who am i").await.unwrap();
        session.history_up();
        session.clear();
        session.clear();

        assert!(session.history().is_empty());
        assert_eq!(session.recall_cursor(), None);
        assert_eq!(session.input(), "");
        assert_eq!(session.history_up(), None);
        assert_eq!(session.recall_cursor(), None);
    }

    #[tokio::test]
    async fn search_filters_without_mutating_history() {
        let session = catalog_session(Arc::new(RecordingExecutor::default()));
        for request in ["list files", "Show Memory", "git history"] {
            session.submit(request).await.unwrap();
        }

        let hits = session.search("MEMORY");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].natural_language, "Show Memory");

        let by_command = session.search("git log");
        assert_eq!(by_command.len(), 1);
        assert_eq!(by_command[0].shell_command, "git log --oneline -10");

        assert_eq!(session.search("").len(), 3);
        assert_eq!(session.history().len(), 3);
    }

    #[tokio::test]
    async fn suggestions_follow_the_setting() {
        let session = catalog_session(Arc::new(RecordingExecutor::default()));
        assert!(!session.suggestions("li").is_empty());

        session.update_settings(SettingsPatch {
            show_suggestions: Some(false),
            ..SettingsPatch::default()
        });
        assert!(session.suggestions("li").is_empty());
    }

    #[tokio::test]
    async fn journal_receives_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        let session = catalog_session(Arc::new(RecordingExecutor::default())).with_journal(&path);

        session.submit("list files").await.unwrap();
        session.submit("current time").await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn mock_session_from_config_round_trips_history() {
        let config = Config {
            engine: crate::config::EngineConfig::default().without_delays(),
            ..Config::default()
        };
        let session = Session::from_config(&config, true);

        let entry = session.submit("where am i").await.unwrap();
        assert_eq!(entry.output, "/home/user/projects/ai-terminal");

        let json = nlterm_common::export_history_json(&session.history()).unwrap();
        let parsed = nlterm_common::parse_history_json(&json).unwrap();
        assert_eq!(parsed, session.history());
    }
}
