use crate::models::{AnalysisResult, RankedPrompt};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Print a run summary in the specified format
pub fn print_summary(
    analysis: &AnalysisResult,
    results_path: &Path,
    report_path: &Path,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Plain => print!("{}", format_plain(analysis, results_path, report_path)),
        OutputFormat::Json => print_json(analysis),
    }
}

/// Summary in plain text format
fn format_plain(analysis: &AnalysisResult, results_path: &Path, report_path: &Path) -> String {
    let mut text = String::from("\nEvaluation Complete\n");
    text.push_str(&format!(
        "Average Score: {:.3}\n",
        analysis.summary.avg_overall_score
    ));

    if let Some(best) = analysis.best_prompts.first() {
        text.push_str(&format!("Best Prompt: {}\n", ranked_line(best)));
    }
    if let Some(worst) = analysis.worst_prompts.first() {
        text.push_str(&format!("Worst Prompt: {}\n", ranked_line(worst)));
    }

    text.push_str(&format!("\nResults saved to {}\n", results_path.display()));
    text.push_str(&format!("Report saved to {}\n", report_path.display()));
    text
}

fn ranked_line(prompt: &RankedPrompt) -> String {
    format!("{} ({:.3})", prompt.template, prompt.overall)
}

/// Print the analysis in JSON format
fn print_json(analysis: &AnalysisResult) {
    match serde_json::to_string_pretty(analysis) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing analysis to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::analysis::tests::uniform_record;

    fn create_test_analysis() -> AnalysisResult {
        let records = vec![
            uniform_record(0, "science_basic", 0.9),
            uniform_record(1, "vocabulary", 0.5),
        ];
        analyze(&records).unwrap()
    }

    #[test]
    fn test_format_plain() {
        let analysis = create_test_analysis();
        let text = format_plain(
            &analysis,
            Path::new("outputs/results.json"),
            Path::new("outputs/evaluation_report.md"),
        );

        assert!(text.contains("Average Score: 0.700"));
        assert!(text.contains("Best Prompt: science_basic (0.900)"));
        assert!(text.contains("Worst Prompt: vocabulary (0.500)"));
        assert!(text.contains("Results saved to outputs/results.json"));
        assert!(text.contains("Report saved to outputs/evaluation_report.md"));
    }

    #[test]
    fn test_json_output() {
        let analysis = create_test_analysis();
        // ensures serialization does not panic
        print_summary(&analysis, Path::new("r.json"), Path::new("r.md"), OutputFormat::Json);
    }

    #[test]
    fn test_analysis_json_shape() {
        let analysis = create_test_analysis();
        let value = serde_json::to_value(&analysis).unwrap();

        assert_eq!(value["summary"]["total_prompts"], 2);
        assert_eq!(value["summary"]["score_distribution"]["poor"], 1);
        assert_eq!(value["failure_modes"][0]["type"], "bias_issues");
        assert_eq!(value["detailed_scores"][0]["template"], "science_basic");
        assert!(value["detailed_scores"][0]["overall"].is_number());
    }
}
