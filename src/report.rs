use crate::models::{AnalysisResult, RankedPrompt, Summary};
use crate::scoring::Metric;

/// Render an analysis as a Markdown report
pub fn generate_report(analysis: &AnalysisResult) -> String {
    let summary = &analysis.summary;
    let mut report = String::from("# Prompt Engineering Evaluation Report\n\n");

    report.push_str(&executive_summary(summary));
    report.push_str(&metric_section(summary));

    report.push_str("## Top 3 Performing Prompts\n");
    report.push_str(&ranking_lines(&analysis.best_prompts));

    report.push_str("\n\n## Bottom 3 Performing Prompts\n");
    report.push_str(&ranking_lines(&analysis.worst_prompts));

    if !analysis.robust_prompts.is_empty() {
        report.push_str("\n\n## Robust Prompts (Score > 0.75)\n");
        for template in &analysis.robust_prompts {
            report.push_str(&format!("- {}\n", template));
        }
    }

    if !analysis.failure_modes.is_empty() {
        report.push_str("\n\n## Identified Failure Modes\n");
        for failure in &analysis.failure_modes {
            report.push_str(&format!("\n### {}\n", title_case(failure.kind.as_str())));
            report.push_str(&format!("- **Count**: {} prompts\n", failure.count));
            report.push_str(&format!("- **Description**: {}\n", failure.description));
            report.push_str(&format!(
                "- **Affected templates**: {}\n",
                failure.templates.join(", ")
            ));
        }
    }

    report.push_str("\n\n## Mitigation Strategies\n");
    for (i, strategy) in analysis.mitigations.iter().enumerate() {
        report.push_str(&format!("\n{}. {}\n", i + 1, strategy));
    }

    report.push_str("\n\n## Key Recommendations\n");
    report.push_str(&recommendations(summary));

    report.push_str(&format!(
        "\n\n---\n*Report generated from {} prompt evaluations*",
        summary.total_prompts
    ));

    report
}

fn executive_summary(summary: &Summary) -> String {
    let distribution = &summary.score_distribution;
    format!(
        "## Executive Summary\n\n\
         - **Total prompts tested**: {}\n\
         - **Average overall score**: {:.3}/1.0\n\
         - **Performance distribution**:\n  \
         - Excellent (>0.8): {} prompts\n  \
         - Good (0.6-0.8): {} prompts\n  \
         - Poor (<0.6): {} prompts\n\n",
        summary.total_prompts,
        summary.avg_overall_score,
        distribution.excellent,
        distribution.good,
        distribution.poor,
    )
}

fn metric_section(summary: &Summary) -> String {
    let averages = &summary.metric_averages;
    let values = [
        (Metric::Fluency, averages.fluency),
        (Metric::Correctness, averages.correctness),
        (Metric::BiasCheck, averages.bias_check),
        (Metric::Clarity, averages.clarity),
        (Metric::AgeAppropriate, averages.age_appropriate),
    ];

    let mut section = String::from("## Metric Averages\n\n");
    for (metric, value) in values {
        section.push_str(&format!("- **{}**: {:.3}\n", metric.label(), value));
    }
    section.push('\n');
    section
}

fn ranking_lines(prompts: &[RankedPrompt]) -> String {
    prompts
        .iter()
        .enumerate()
        .map(|(i, p)| format!("\n{}. **{}**: {:.3}", i + 1, p.template, p.overall))
        .collect()
}

fn recommendations(summary: &Summary) -> String {
    let mut lines = String::new();

    let verdict = if summary.avg_overall_score >= 0.8 {
        "Excellent. Current prompts are highly effective."
    } else if summary.avg_overall_score >= 0.6 {
        "Good with room for improvement."
    } else {
        "Needs significant improvement."
    };
    lines.push_str(&format!("\n- **Overall Performance**: {}", verdict));

    let metrics = &summary.metric_averages;
    if metrics.bias_check < 0.8 {
        lines.push_str("\n- **Priority**: Address potential bias issues in prompt design");
    }
    if metrics.correctness < 0.7 {
        lines.push_str("\n- **Focus Area**: Improve factual accuracy and evidence-based responses");
    }
    if metrics.age_appropriate < 0.7 {
        lines.push_str("\n- **Target**: Better age-appropriate language and concepts");
    }

    lines
}

/// "age_appropriateness" -> "Age Appropriateness"
fn title_case(identifier: &str) -> String {
    identifier
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
