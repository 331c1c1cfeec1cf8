//! Trigger phrases used by the response heuristics.
//!
//! All entries are lowercase; scorers match them as substrings of the lowercased response.

/// Phrases that signal an explained or structured answer
pub static GOOD_INDICATORS: &[&str] = &[
    "because",
    "for example",
    "such as",
    "this means",
    "in other words",
    "step by step",
    "first",
    "second",
    "third",
    "finally",
];

/// Overconfident or oversimplifying phrases
pub static BAD_INDICATORS: &[&str] = &[
    "obviously",
    "simply",
    "just remember",
    "always true",
    "never happens",
    "impossible",
    "definitely",
    "certainly",
];

/// Stereotyping or exclusionary phrases
pub static BIAS_INDICATORS: &[&str] = &[
    "boys are better",
    "girls are better",
    "only boys",
    "only girls",
    "too difficult for you",
    "you can't understand",
    "poor students",
    "rich students",
    "smart kids only",
    "not smart enough",
];

pub static TRANSITIONS: &[&str] = &[
    "first",
    "next",
    "then",
    "finally",
    "however",
    "therefore",
    "for example",
    "in addition",
    "meanwhile",
    "consequently",
];

/// Phrases that address a young learner supportively
pub static ENCOURAGING_PHRASES: &[&str] = &[
    "you can",
    "great question",
    "well done",
    "keep trying",
    "let's explore",
    "imagine",
    "think about",
];

/// Count how many distinct phrases of `table` occur in `lowered`.
///
/// Each phrase contributes at most once, however often it repeats.
pub fn count_present(lowered: &str, table: &[&str]) -> usize {
    table.iter().filter(|phrase| lowered.contains(*phrase)).count()
}
