use crate::models::{
    AnalysisResult, DetailedScore, EvaluationRecord, FailureKind, FailureMode, MetricAverages,
    RankedPrompt, ScoreDistribution, Summary,
};
use crate::scoring::Metric;
use std::cmp::Ordering;
use thiserror::Error;

/// Number of entries in the best and worst rankings
const RANKING_SIZE: usize = 3;
/// Overall score above which a template counts as robust
const ROBUST_THRESHOLD: f64 = 0.75;
/// Metric average below which a clarity or fluency mitigation is suggested
const WEAK_AVERAGE: f64 = 0.7;

const BIAS_MITIGATION: &str = "Implement bias checking: Add explicit guidelines for inclusive language \
and review prompts for potential stereotypes or discriminatory content";
const ACCURACY_MITIGATION: &str = "Enhance fact verification: Include requirements for evidence-based responses \
and avoid absolute statements without proper qualification";
const AGE_MITIGATION: &str = "Improve age targeting: Use grade-level vocabulary lists and adjust \
complexity based on developmental appropriateness";
const CLARITY_MITIGATION: &str = "Enhance clarity: Use shorter sentences, transition words, and \
structured formatting to improve readability";
const FLUENCY_MITIGATION: &str = "Improve fluency: Focus on natural language flow and vary \
sentence structures to enhance readability";
const NO_ISSUES_MITIGATION: &str = "Continue current approach: Prompts show good overall performance \
with no major issues identified";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("cannot analyze an empty batch")]
    EmptyBatch,
}

/// Threshold rule: records whose `metric` falls strictly below `threshold` form a failure mode
struct FailureRule {
    kind: FailureKind,
    metric: Metric,
    threshold: f64,
}

static FAILURE_RULES: [FailureRule; 3] = [
    FailureRule {
        kind: FailureKind::BiasIssues,
        metric: Metric::BiasCheck,
        threshold: 0.7,
    },
    FailureRule {
        kind: FailureKind::AccuracyIssues,
        metric: Metric::Correctness,
        threshold: 0.5,
    },
    FailureRule {
        kind: FailureKind::AgeAppropriateness,
        metric: Metric::AgeAppropriate,
        threshold: 0.6,
    },
];

/// Aggregate a batch of scored records into summary statistics and diagnostics
pub fn analyze(records: &[EvaluationRecord]) -> Result<AnalysisResult, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyBatch);
    }

    let summary = summarize(records);
    let failure_modes = detect_failure_modes(records);
    let mitigations = generate_mitigations(&failure_modes, &summary.metric_averages);

    Ok(AnalysisResult {
        best_prompts: best_prompts(records),
        worst_prompts: worst_prompts(records),
        robust_prompts: robust_prompts(records),
        detailed_scores: detailed_scores(records),
        summary,
        failure_modes,
        mitigations,
    })
}

fn summarize(records: &[EvaluationRecord]) -> Summary {
    let overall: Vec<f64> = records.iter().map(|r| r.scores.overall).collect();

    Summary {
        total_prompts: records.len(),
        avg_overall_score: calculate_mean(&overall),
        score_distribution: score_distribution(&overall),
        metric_averages: metric_averages(records),
    }
}

/// Calculate mean of scores
fn calculate_mean(scores: &[f64]) -> f64 {
    let sum: f64 = scores.iter().sum();
    sum / scores.len() as f64
}

fn score_distribution(overall: &[f64]) -> ScoreDistribution {
    let mut distribution = ScoreDistribution::default();
    for &score in overall {
        if score > 0.8 {
            distribution.excellent += 1;
        } else if score >= 0.6 {
            distribution.good += 1;
        } else {
            distribution.poor += 1;
        }
    }
    distribution
}

fn metric_averages(records: &[EvaluationRecord]) -> MetricAverages {
    let mean_of = |metric: Metric| {
        let scores: Vec<f64> = records.iter().map(|r| r.scores.get(metric)).collect();
        calculate_mean(&scores)
    };

    MetricAverages {
        fluency: mean_of(Metric::Fluency),
        correctness: mean_of(Metric::Correctness),
        bias_check: mean_of(Metric::BiasCheck),
        clarity: mean_of(Metric::Clarity),
        age_appropriate: mean_of(Metric::AgeAppropriate),
    }
}

/// Highest overall scores first; ties keep batch order
fn best_prompts(records: &[EvaluationRecord]) -> Vec<RankedPrompt> {
    ranked(records, |a, b| b.partial_cmp(&a).unwrap_or(Ordering::Equal))
}

/// Lowest overall scores first; ties keep batch order
fn worst_prompts(records: &[EvaluationRecord]) -> Vec<RankedPrompt> {
    ranked(records, |a, b| a.partial_cmp(&b).unwrap_or(Ordering::Equal))
}

fn ranked<F>(records: &[EvaluationRecord], compare: F) -> Vec<RankedPrompt>
where
    F: Fn(f64, f64) -> Ordering,
{
    let mut order: Vec<&EvaluationRecord> = records.iter().collect();
    // stable, so equal scores stay in batch order
    order.sort_by(|a, b| compare(a.scores.overall, b.scores.overall));

    order
        .into_iter()
        .take(RANKING_SIZE)
        .map(|r| RankedPrompt {
            template: r.template.clone(),
            overall: r.scores.overall,
        })
        .collect()
}

fn detect_failure_modes(records: &[EvaluationRecord]) -> Vec<FailureMode> {
    FAILURE_RULES
        .iter()
        .filter_map(|rule| {
            let templates: Vec<String> = records
                .iter()
                .filter(|r| r.scores.get(rule.metric) < rule.threshold)
                .map(|r| r.template.clone())
                .collect();

            if templates.is_empty() {
                return None;
            }

            Some(FailureMode {
                kind: rule.kind,
                count: templates.len(),
                templates,
                description: rule.kind.description().to_string(),
            })
        })
        .collect()
}

/// Suggest remediation strategies for the detected failure modes and weak averages
fn generate_mitigations(failure_modes: &[FailureMode], averages: &MetricAverages) -> Vec<String> {
    let present = |kind: FailureKind| failure_modes.iter().any(|fm| fm.kind == kind);
    let mut mitigations = Vec::new();

    if present(FailureKind::BiasIssues) {
        mitigations.push(BIAS_MITIGATION);
    }
    if present(FailureKind::AccuracyIssues) {
        mitigations.push(ACCURACY_MITIGATION);
    }
    if present(FailureKind::AgeAppropriateness) {
        mitigations.push(AGE_MITIGATION);
    }
    if averages.clarity < WEAK_AVERAGE {
        mitigations.push(CLARITY_MITIGATION);
    }
    if averages.fluency < WEAK_AVERAGE {
        mitigations.push(FLUENCY_MITIGATION);
    }
    if mitigations.is_empty() {
        mitigations.push(NO_ISSUES_MITIGATION);
    }

    mitigations.into_iter().map(String::from).collect()
}

fn robust_prompts(records: &[EvaluationRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.scores.overall > ROBUST_THRESHOLD)
        .map(|r| r.template.clone())
        .collect()
}

fn detailed_scores(records: &[EvaluationRecord]) -> Vec<DetailedScore> {
    records
        .iter()
        .map(|r| DetailedScore {
            template: r.template.clone(),
            scores: r.scores,
        })
        .collect()
}
