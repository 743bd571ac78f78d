use crate::{PlaybackError, PoseStore, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Expand a requested word into the ordered pose labels that spell it.
///
/// Whole-word poses win over spelling: an exact key is used as is, and `yes`/`no` in
/// any case map onto their lowercase (else uppercase) pose when one was recorded.
/// Otherwise each non-whitespace character is matched as is, then lowercased, then
/// uppercased. A single unmatched character fails the whole word.
pub fn resolve(label: &str, store: &PoseStore) -> Result<Vec<String>> {
    if store.contains(label) {
        return Ok(vec![label.to_string()]);
    }

    let lower = label.to_lowercase();
    if lower == "yes" || lower == "no" {
        let upper = lower.to_uppercase();
        if store.contains(&lower) {
            return Ok(vec![lower]);
        }
        if store.contains(&upper) {
            return Ok(vec![upper]);
        }
    }

    let mut sequence = Vec::new();
    for ch in label.chars().filter(|c| !c.is_whitespace()) {
        let exact = ch.to_string();
        let candidates = [exact, ch.to_lowercase().collect(), ch.to_uppercase().collect()];
        match candidates.into_iter().find(|c| store.contains(c)) {
            Some(found) => sequence.push(found),
            None => {
                tracing::debug!("no pose for character '{}' of '{}'", ch, label);
                return Err(PlaybackError::NotFound(label.to_string()));
            }
        }
    }

    if sequence.is_empty() {
        return Err(PlaybackError::NotFound(label.to_string()));
    }
    Ok(sequence)
}

/// Reduce free-form model output to its word tokens.
///
/// Surrounding punctuation is dropped and the remaining alphanumeric tokens are joined
/// by single spaces, e.g. `"  Yes!!"` becomes `"Yes"`.
pub fn sanitize_answer(text: &str) -> String {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

    let trimmed = text
        .trim()
        .trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'));
    if trimmed.is_empty() {
        return String::new();
    }

    let re = TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9][A-Za-z0-9'\-]*").expect("Invalid regex pattern - this is a bug")
    });
    let tokens: Vec<&str> = re.find_iter(trimmed).map(|m| m.as_str()).collect();
    if tokens.is_empty() {
        trimmed.to_string()
    } else {
        tokens.join(" ")
    }
}
