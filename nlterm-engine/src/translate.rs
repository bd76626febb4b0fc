// ABOUTME: resolves natural-language requests to shell commands using the phrase catalog.
// ABOUTME: matching is deterministic: containment, then word-overlap scoring, then a help fallback.

use async_trait::async_trait;
use nlterm_common::{SafetyLevel, Translation};
use tracing::debug;

use crate::delay::DelayRange;
use crate::error::EngineError;
use crate::phrases::{PhraseEntry, PHRASES};
use crate::policy;

pub const DIRECT_MATCH_CONFIDENCE: f64 = 0.95;
pub const FALLBACK_CONFIDENCE: f64 = 0.3;
pub const FALLBACK_COMMAND: &str =
    r#"echo "Command not recognized. Try: list files, show disk space, git status""#;
pub const FALLBACK_ALTERNATIVES: [&str; 4] =
    ["list files", "show disk space", "running processes", "git status"];

const MAX_ALTERNATIVES: usize = 3;
// Single letters ("a", "i") overlap with almost every key.
const MIN_FUZZY_TOKEN_CHARS: usize = 2;
// Below this length words must match exactly; "in" is inside "thing".
const MIN_PARTIAL_MATCH_CHARS: usize = 3;

#[async_trait]
pub trait CommandTranslator: Send + Sync {
    async fn translate(&self, text: &str, level: SafetyLevel) -> Result<Translation, EngineError>;
}

/// Catalog-backed translator with an artificial processing delay.
#[derive(Debug, Clone)]
pub struct PhraseTranslator {
    delay: DelayRange,
}

impl PhraseTranslator {
    pub fn new(delay: DelayRange) -> Self {
        Self { delay }
    }

    pub fn instant() -> Self {
        Self::new(DelayRange::NONE)
    }
}

impl Default for PhraseTranslator {
    fn default() -> Self {
        Self::new(DelayRange(500, 1000))
    }
}

#[async_trait]
impl CommandTranslator for PhraseTranslator {
    async fn translate(&self, text: &str, level: SafetyLevel) -> Result<Translation, EngineError> {
        self.delay.sleep().await;
        Ok(resolve(text, level))
    }
}

pub fn resolve(text: &str, level: SafetyLevel) -> Translation {
    let normalized = text.trim().to_lowercase();

    if let Some(entry) = containment_match(&normalized) {
        debug!(key = entry.key, "direct phrase match");
        return Translation {
            original_query: text.to_string(),
            shell_command: entry.command.to_string(),
            explanation: entry.explanation.to_string(),
            confidence: DIRECT_MATCH_CONFIDENCE,
            alternatives: None,
            safety_check: policy::validate(entry.command, level),
        };
    }

    let words = fuzzy_tokens(&normalized);
    if let Some((entry, score)) = best_fuzzy_match(&words) {
        debug!(key = entry.key, score, "fuzzy phrase match");
        return Translation {
            original_query: text.to_string(),
            shell_command: entry.command.to_string(),
            explanation: entry.explanation.to_string(),
            confidence: 0.7 + 0.1 * score as f64,
            alternatives: Some(alternatives(&words)),
            safety_check: policy::validate(entry.command, level),
        };
    }

    debug!(query = %normalized, "no phrase match, using help fallback");
    Translation {
        original_query: text.to_string(),
        shell_command: FALLBACK_COMMAND.to_string(),
        explanation: format!(
            "I couldn't find a direct translation for \"{text}\". Here are some things I can help with: file operations, system info, process management, network commands, and git operations."
        ),
        confidence: FALLBACK_CONFIDENCE,
        alternatives: Some(FALLBACK_ALTERNATIVES.iter().map(|s| s.to_string()).collect()),
        safety_check: policy::validate(FALLBACK_COMMAND, level),
    }
}

fn containment_match(normalized: &str) -> Option<&'static PhraseEntry> {
    if normalized.is_empty() {
        return None;
    }
    PHRASES
        .iter()
        .filter(|p| !p.key.trim().is_empty())
        .find(|p| normalized.contains(p.key) || p.key.contains(normalized))
}

fn fuzzy_tokens(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|w| w.chars().count() >= MIN_FUZZY_TOKEN_CHARS)
        .collect()
}

fn score(words: &[&str], key: &str) -> usize {
    let key_words = fuzzy_tokens(key);
    words
        .iter()
        .filter(|w| key_words.iter().any(|kw| words_overlap(w, kw)))
        .count()
}

fn words_overlap(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.chars().count() >= MIN_PARTIAL_MATCH_CHARS && long.contains(short)
}

fn best_fuzzy_match(words: &[&str]) -> Option<(&'static PhraseEntry, usize)> {
    let mut best: Option<(&'static PhraseEntry, usize)> = None;
    for entry in PHRASES {
        let s = score(words, entry.key);
        if s > 0 && best.map_or(true, |(_, top)| s > top) {
            best = Some((entry, s));
        }
    }
    best
}

fn alternatives(words: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in PHRASES {
        if out.len() >= MAX_ALTERNATIVES {
            break;
        }
        let related = words.iter().any(|w| entry.key.contains(*w));
        if related && !out.iter().any(|c| c == entry.command) {
            out.push(entry.command.to_string());
        }
    }
    out
}
