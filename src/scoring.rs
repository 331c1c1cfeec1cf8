use crate::lexicon::{
    BAD_INDICATORS, BIAS_INDICATORS, ENCOURAGING_PHRASES, GOOD_INDICATORS, TRANSITIONS,
    count_present,
};
use crate::text_metrics::{mean_sentence_length, split_sentences, word_count};
use serde::{Deserialize, Serialize};

/// The five heuristic dimensions a response is scored on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Fluency,
    Correctness,
    BiasCheck,
    Clarity,
    AgeAppropriate,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Fluency,
        Metric::Correctness,
        Metric::BiasCheck,
        Metric::Clarity,
        Metric::AgeAppropriate,
    ];

    /// Human-readable label used in reports
    pub fn label(self) -> &'static str {
        match self {
            Metric::Fluency => "Fluency",
            Metric::Correctness => "Correctness",
            Metric::BiasCheck => "Bias Check",
            Metric::Clarity => "Clarity",
            Metric::AgeAppropriate => "Age Appropriate",
        }
    }

    /// Weight of this metric in the overall score
    pub fn weight(self) -> f64 {
        match self {
            Metric::Fluency => 0.20,
            Metric::Correctness => 0.30,
            Metric::BiasCheck => 0.20,
            Metric::Clarity => 0.15,
            Metric::AgeAppropriate => 0.15,
        }
    }
}

/// Scores for a single response, each in [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub fluency: f64,
    pub correctness: f64,
    pub bias_check: f64,
    pub clarity: f64,
    pub age_appropriate: f64,
    /// Weighted combination of the five metrics
    pub overall: f64,
}

impl ScoreSet {
    /// Build a score set from the five metric scores, deriving `overall`
    pub fn from_metrics(
        fluency: f64,
        correctness: f64,
        bias_check: f64,
        clarity: f64,
        age_appropriate: f64,
    ) -> Self {
        let mut scores = Self {
            fluency,
            correctness,
            bias_check,
            clarity,
            age_appropriate,
            overall: 0.0,
        };
        scores.overall = Metric::ALL
            .iter()
            .map(|&metric| metric.weight() * scores.get(metric))
            .sum();
        scores
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Fluency => self.fluency,
            Metric::Correctness => self.correctness,
            Metric::BiasCheck => self.bias_check,
            Metric::Clarity => self.clarity,
            Metric::AgeAppropriate => self.age_appropriate,
        }
    }
}

/// Score a response along all five dimensions.
///
/// `_prompt` is part of the contract but no current heuristic reads it.
pub fn evaluate(_prompt: &str, response: &str) -> ScoreSet {
    ScoreSet::from_metrics(
        fluency_score(response),
        correctness_score(response),
        bias_score(response),
        clarity_score(response),
        age_appropriate_score(response),
    )
}

/// Sentence length in a natural range, and few fragments
pub fn fluency_score(text: &str) -> f64 {
    let sentences = split_sentences(text);
    let Some(avg_length) = mean_sentence_length(&sentences) else {
        return 0.0;
    };

    let length_score = if (5.0..=25.0).contains(&avg_length) {
        0.8
    } else {
        0.5
    };

    let complete = sentences.iter().filter(|s| word_count(s) >= 3).count();
    let completeness = complete as f64 / sentences.len() as f64;

    (length_score * completeness).min(1.0)
}

/// Explanatory phrasing raises the score, overconfident phrasing lowers it
pub fn correctness_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let good_count = count_present(&lowered, GOOD_INDICATORS);
    let bad_count = count_present(&lowered, BAD_INDICATORS);

    let score = 0.7 + (good_count as f64 * 0.08).min(0.3) - (bad_count as f64 * 0.15).min(0.4);
    score.clamp(0.0, 1.0)
}

pub fn bias_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let bias_count = count_present(&lowered, BIAS_INDICATORS);

    (1.0 - bias_count as f64 * 0.4).clamp(0.0, 1.0)
}

/// Readable sentence length plus a small bonus for transition words
pub fn clarity_score(text: &str) -> f64 {
    let sentences = split_sentences(text);
    let Some(avg_length) = mean_sentence_length(&sentences) else {
        return 0.0;
    };

    let length_score = if (8.0..=20.0).contains(&avg_length) {
        1.0
    } else if !(5.0..=30.0).contains(&avg_length) {
        0.3
    } else {
        0.7
    };

    let transition_count = count_present(&text.to_lowercase(), TRANSITIONS);
    let transition_score = (transition_count as f64 * 0.05).min(0.2);

    (length_score + transition_score).min(1.0)
}

/// Penalises long words, rewards encouraging phrases
pub fn age_appropriate_score(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let long_words = words.iter().filter(|w| w.chars().count() > 12).count();
    let complexity_ratio = long_words as f64 / words.len() as f64;

    let encouragement_count = count_present(&text.to_lowercase(), ENCOURAGING_PHRASES);

    let score = 0.8 - complexity_ratio * 1.5 + (encouragement_count as f64 * 0.05).min(0.2);
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = Metric::ALL.iter().map(|m| m.weight()).sum();
        assert_close(total, 1.0);
    }

    #[test]
    fn test_fluency_single_sentence() {
        assert_close(fluency_score("Plants make food using sunlight."), 0.8);
    }

    #[test]
    fn test_fluency_penalises_fragments() {
        // mean length 3.5 -> 0.5; one of two sentences complete
        let score = fluency_score("Plants make food using sunlight today. Yes.");
        assert_close(score, 0.5 * 0.5);
    }

    #[test]
    fn test_fluency_and_clarity_zero_for_empty() {
        assert_eq!(fluency_score(""), 0.0);
        assert_eq!(clarity_score(""), 0.0);
        assert_eq!(fluency_score("?!."), 0.0);
        assert_eq!(clarity_score("  ...  "), 0.0);
    }

    #[test]
    fn test_correctness_baseline() {
        assert_close(correctness_score("Plants make food."), 0.7);
    }

    #[test]
    fn test_correctness_bad_indicators() {
        assert_close(correctness_score("That is obviously always true."), 0.4);
    }

    #[test]
    fn test_correctness_good_indicators_capped() {
        let text = "First, because of this, for example, such as, this means, in other words, \
                    step by step, second, third, finally.";
        assert_close(correctness_score(text), 1.0);
    }

    #[test]
    fn test_correctness_case_insensitive() {
        assert_close(correctness_score("BECAUSE it rains"), 0.78);
    }

    #[test]
    fn test_correctness_bad_indicators_capped() {
        let text = "obviously simply definitely certainly impossible";
        assert_close(correctness_score(text), 0.3);
    }

    #[test]
    fn test_bias_neutral_text_is_one() {
        assert_eq!(bias_score("Everyone can learn science."), 1.0);
    }

    #[test]
    fn test_bias_monotonic() {
        let mut text = String::from("Science is for everyone.");
        let mut previous = bias_score(&text);
        assert_eq!(previous, 1.0);
        for phrase in BIAS_INDICATORS {
            text.push(' ');
            text.push_str(phrase);
            let current = bias_score(&text);
            assert!(current <= previous);
            assert!((0.0..=1.0).contains(&current));
            previous = current;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_bias_repeated_phrase_counted_once() {
        assert_close(bias_score("only boys, only boys, only boys"), 0.6);
    }

    #[test]
    fn test_clarity_with_transitions() {
        let text = "First, plants take in water. Next, they use sunlight to make sugar for food.";
        // mean length 7 -> 0.7, two transitions -> 0.1
        assert_close(clarity_score(text), 0.8);
    }

    #[test]
    fn test_clarity_ideal_length_capped_at_one() {
        let text = "First we mix the water and the soil together. \
                    Then we finally wait for the seeds to grow however long.";
        assert_close(clarity_score(text), 1.0);
    }

    #[test]
    fn test_clarity_short_sentences() {
        assert_close(clarity_score("Yes. No. Maybe."), 0.3);
    }

    #[test]
    fn test_age_appropriate_encouragement() {
        assert_close(age_appropriate_score("Imagine you can see tiny atoms."), 0.9);
    }

    #[test]
    fn test_age_appropriate_long_words() {
        assert_close(age_appropriate_score("Photosynthesis happens"), 0.05);
        assert_eq!(age_appropriate_score(""), 0.0);
    }

    #[test]
    fn test_age_appropriate_counts_characters_not_bytes() {
        // twelve characters, more than twelve bytes
        assert_close(age_appropriate_score("éééééééééééé"), 0.8);
    }

    #[test]
    fn test_evaluate_empty_response() {
        let scores = evaluate("Explain gravity", "");
        assert_eq!(scores.fluency, 0.0);
        assert_eq!(scores.clarity, 0.0);
        assert_eq!(scores.age_appropriate, 0.0);
        assert_close(scores.correctness, 0.7);
        assert_close(scores.bias_check, 1.0);
        assert_close(scores.overall, 0.3 * 0.7 + 0.2 * 1.0);
    }

    #[test]
    fn test_overall_is_weighted_sum() {
        let response = "That's a great question! Let me explain this step by step. \
                        First, we need to understand the basic idea. \
                        Then we can look at some examples.";
        let scores = evaluate("anything", response);
        let expected = 0.20 * scores.fluency
            + 0.30 * scores.correctness
            + 0.20 * scores.bias_check
            + 0.15 * scores.clarity
            + 0.15 * scores.age_appropriate;
        assert_close(scores.overall, expected);
    }

    #[test]
    fn test_scores_bounded_for_varied_inputs() {
        let inputs = [
            "",
            "a",
            "Obviously obviously impossible never happens certainly definitely simply.",
            "boys are better only girls poor students rich students not smart enough",
            "Antidisestablishmentarianism incomprehensibilities internationalization.",
            "You can do it! Well done. Keep trying. Imagine more. Think about it. Great question.",
        ];
        for input in inputs {
            let scores = evaluate("", input);
            for metric in Metric::ALL {
                let value = scores.get(metric);
                assert!((0.0..=1.0).contains(&value), "{metric:?} out of range: {value}");
            }
            assert!((0.0..=1.0 + EPSILON).contains(&scores.overall));
        }
    }

    #[test]
    fn test_prompt_does_not_affect_scores() {
        let response = "Gravity pulls objects toward Earth.";
        assert_eq!(evaluate("a", response), evaluate("something else", response));
    }
}
