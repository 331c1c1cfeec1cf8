use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_TERMINATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence terminator pattern is valid"));

/// Split text into trimmed, non-empty sentences on runs of `.`, `!` and `?`
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_TERMINATORS
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Number of whitespace-separated tokens
pub fn word_count(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}

/// Mean words per sentence, or `None` when there are no sentences
pub fn mean_sentence_length(sentences: &[&str]) -> Option<f64> {
    if sentences.is_empty() {
        return None;
    }

    let total: usize = sentences.iter().map(|s| word_count(s)).sum();
    Some(total as f64 / sentences.len() as f64)
}
