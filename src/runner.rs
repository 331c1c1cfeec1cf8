use crate::analysis::analyze;
use crate::catalog::PromptCatalog;
use crate::config::Config;
use crate::models::{EvaluationRecord, RunOutput, TestCase};
use crate::report::generate_report;
use crate::responder::Responder;
use crate::scoring::evaluate;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const RESULTS_FILE: &str = "results.json";
pub const REPORT_FILE: &str = "evaluation_report.md";

/// Main runner that orchestrates the evaluation pipeline
pub struct Runner {
    catalog: PromptCatalog,
    responder: Responder,
    cases: Vec<TestCase>,
    output_dir: PathBuf,
}

impl Runner {
    /// Create a runner from a loaded configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut catalog = PromptCatalog::builtin();
        for (name, text) in &config.templates {
            catalog
                .register(name, text)
                .with_context(|| format!("Invalid template in configuration: {}", name))?;
        }
        log::debug!("Templates available: {}", catalog.names().join(", "));

        Ok(Self {
            catalog,
            responder: Responder::from_config(&config.responder),
            cases: config.load_cases()?,
            output_dir: config.output_dir.clone(),
        })
    }

    /// Run every test case, analyze the batch and write the artifacts
    pub async fn run(&mut self) -> Result<RunOutput> {
        let results = self.process_all_cases().await?;

        log::info!("Analyzing {} results", results.len());
        let analysis = analyze(&results).context("Failed to analyze results")?;
        let report = generate_report(&analysis);

        let output = RunOutput {
            results,
            analysis,
            report,
        };
        self.store_output(&output)?;

        Ok(output)
    }

    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(RESULTS_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE)
    }

    /// Score every case in order; the first rendering failure aborts the run
    async fn process_all_cases(&mut self) -> Result<Vec<EvaluationRecord>> {
        let total = self.cases.len();
        log::info!("Processing {} test cases...", total);

        let cases = self.cases.clone();
        let mut results = Vec::with_capacity(total);

        for (id, case) in cases.iter().enumerate() {
            let record = self
                .evaluate_case(id, case)
                .await
                .with_context(|| format!("Failed to evaluate case {} ({})", id, case.template))?;

            log::info!("Processed {}/{}: {}", id + 1, total, case.template);
            results.push(record);
        }

        Ok(results)
    }

    /// Render, generate and score a single case
    async fn evaluate_case(&mut self, id: usize, case: &TestCase) -> Result<EvaluationRecord> {
        let prompt = self.catalog.render(&case.template, &case.params)?;
        log::debug!("Rendered prompt: {}", prompt);

        let response = self
            .responder
            .generate(&prompt)
            .await
            .context("Failed to generate response")?;

        let scores = evaluate(&prompt, &response);
        log::debug!("Overall score for case {}: {:.3}", id, scores.overall);

        Ok(EvaluationRecord {
            id,
            template: case.template.clone(),
            prompt,
            response,
            scores,
        })
    }

    /// Write results.json and the Markdown report
    fn store_output(&self, output: &RunOutput) -> Result<()> {
        ensure_directory_exists(&self.output_dir)?;

        let json_content = serde_json::to_string_pretty(output)
            .context("Failed to serialize results to JSON")?;
        write_file(&self.results_path(), &json_content)?;
        write_file(&self.report_path(), &output.report)?;

        log::info!("Results stored to: {}", self.output_dir.display());
        Ok(())
    }
}

fn ensure_directory_exists(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write: {}", path.display()))
}
