use crate::scoring::ScoreSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scored prompt-response pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Position in the batch
    pub id: usize,
    /// Name of the template the prompt was rendered from
    pub template: String,
    /// Rendered prompt text
    pub prompt: String,
    /// Raw response text
    pub response: String,
    pub scores: ScoreSet,
}

/// Test case as read from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub template: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreDistribution {
    /// overall > 0.8
    pub excellent: usize,
    /// 0.6 <= overall <= 0.8
    pub good: usize,
    /// overall < 0.6
    pub poor: usize,
}

/// Mean of each metric across a batch
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricAverages {
    pub fluency: f64,
    pub correctness: f64,
    pub bias_check: f64,
    pub clarity: f64,
    pub age_appropriate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_prompts: usize,
    pub avg_overall_score: f64,
    pub score_distribution: ScoreDistribution,
    pub metric_averages: MetricAverages,
}

/// A template and its overall score, as listed in rankings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrompt {
    pub template: String,
    pub overall: f64,
}

/// Category of batch-level weakness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    BiasIssues,
    AccuracyIssues,
    AgeAppropriateness,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::BiasIssues => "bias_issues",
            FailureKind::AccuracyIssues => "accuracy_issues",
            FailureKind::AgeAppropriateness => "age_appropriateness",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FailureKind::BiasIssues => "Prompts showing potential bias or non-inclusive language",
            FailureKind::AccuracyIssues => "Prompts with potential accuracy or factual concerns",
            FailureKind::AgeAppropriateness => "Prompts not well-suited for target age group",
        }
    }
}

/// Records that fell below one metric threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMode {
    #[serde(rename = "type")]
    pub kind: FailureKind,
    pub count: usize,
    /// Template of every violating record, in batch order
    pub templates: Vec<String>,
    pub description: String,
}

/// Per-record scores exported alongside the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedScore {
    pub template: String,
    #[serde(flatten)]
    pub scores: ScoreSet,
}

/// Aggregate diagnostics for a whole batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: Summary,
    pub best_prompts: Vec<RankedPrompt>,
    pub worst_prompts: Vec<RankedPrompt>,
    pub failure_modes: Vec<FailureMode>,
    pub mitigations: Vec<String>,
    pub robust_prompts: Vec<String>,
    pub detailed_scores: Vec<DetailedScore>,
}

/// Everything produced by one run
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub results: Vec<EvaluationRecord>,
    pub analysis: AnalysisResult,
    #[serde(skip)]
    pub report: String,
}
