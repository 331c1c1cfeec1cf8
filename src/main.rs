use clap::Parser;
use std::path::PathBuf;

mod analysis;
mod catalog;
mod config;
mod lexicon;
mod models;
mod output;
mod report;
mod responder;
mod runner;
mod scoring;
mod text_metrics;

use crate::config::Config;
use crate::output::OutputFormat;
use crate::runner::Runner;

/// Prompt Evaluation CLI - Render educational prompts, score the responses and report on the batch
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML run configuration
    run_file: PathBuf,

    /// Output format: plain or json
    #[arg(short, long, default_value = "plain")]
    output: OutputFormat,

    /// Verbose output - log every rendered prompt and score
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    log::info!("Starting Prompt Evaluation Pipeline");

    let config = Config::from_file(&args.run_file)?;
    let mut runner = Runner::new(&config)?;

    let output = runner.run().await?;

    output::print_summary(
        &output.analysis,
        &runner.results_path(),
        &runner.report_path(),
        args.output,
    );

    Ok(())
}
