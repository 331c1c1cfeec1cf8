use crate::models::TestCase;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Settings for an OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiSettings {
    /// OpenAI API endpoint
    pub api_endpoint: String,
    /// Environment variable name containing the API key
    pub env_var_api_key: String,
    /// Model to use for generating responses
    pub model: String,
    /// Temperature for response generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens for response generation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u16,
    /// Rate limit for API requests per second
    #[serde(default = "default_rate_limit")]
    pub rate_limit_rps: f64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Replies shorter than this (after trimming) count as failed generations
    #[serde(default = "default_min_response_chars")]
    pub min_response_chars: usize,
    /// Answer from the canned table when generation fails
    #[serde(default = "default_fallback_to_mock")]
    pub fallback_to_mock: bool,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u16 {
    150
}

fn default_rate_limit() -> f64 {
    10.0
}

fn default_system_prompt() -> String {
    "You are a patient tutor who explains ideas clearly to school students.".to_string()
}

fn default_min_response_chars() -> usize {
    20
}

fn default_fallback_to_mock() -> bool {
    true
}

/// Where model responses come from
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResponderConfig {
    /// Canned responses keyed on prompt keywords
    #[default]
    Mock,
    #[serde(rename = "openai")]
    OpenAi(OpenAiSettings),
}

/// Root configuration for an evaluation run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory receiving results.json and evaluation_report.md
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Optional JSON file holding an array of test cases
    #[serde(default)]
    pub cases_path: Option<PathBuf>,
    /// Test cases listed inline; these run before the ones from `cases_path`
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// Extra templates merged over the built-in catalog
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
    #[serde(default)]
    pub responder: ResponderConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?;

        // relative paths are resolved against the config file's directory
        if let Some(base) = path.parent() {
            config.output_dir = base.join(&config.output_dir);
            config.cases_path = config.cases_path.map(|p| base.join(p));
        }

        Ok(config)
    }

    /// All test cases in run order: inline cases, then those from `cases_path`
    pub fn load_cases(&self) -> Result<Vec<TestCase>> {
        let mut cases = self.cases.clone();

        if let Some(path) = &self.cases_path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read test cases: {}", path.display()))?;
            let file_cases: Vec<TestCase> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse test cases: {}", path.display()))?;
            cases.extend(file_cases);
        }

        Ok(cases)
    }
}
