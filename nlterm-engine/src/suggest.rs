// ABOUTME: offers phrase-catalog keys that complete or contain a partially typed request.
// ABOUTME: results keep catalog order and are capped so the input affordance stays small.

use nlterm_common::{Suggestion, SuggestionCategory};

use crate::phrases::PHRASES;

pub const MAX_SUGGESTIONS: usize = 5;
const MIN_PREFIX_CHARS: usize = 2;

pub fn suggest(partial: &str) -> Vec<&'static str> {
    let normalized = partial.to_lowercase();
    let normalized = normalized.trim();
    if normalized.chars().count() < MIN_PREFIX_CHARS {
        return Vec::new();
    }

    PHRASES
        .iter()
        .map(|p| p.key)
        .filter(|key| key.starts_with(normalized) || key.contains(normalized))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Suggestion records for the input affordance. Short raw input yields
/// nothing, even before trimming.
pub fn suggestion_records(input: &str) -> Vec<Suggestion> {
    if input.chars().count() < MIN_PREFIX_CHARS {
        return Vec::new();
    }

    suggest(input)
        .into_iter()
        .enumerate()
        .map(|(index, key)| Suggestion {
            id: uuid::Uuid::new_v4().to_string(),
            command: key.to_string(),
            description: format!("Suggested: {key}"),
            frequency: (MAX_SUGGESTIONS - index) as u32,
            category: SuggestionCategory::AiSuggested,
        })
        .collect()
}
