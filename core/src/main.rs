//! CLI entry point for esc-infer.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use esc_infer::cli::{Cli, OutputFormat};
use esc_infer::config::Config;
use esc_infer::inputs::InputContainer;
use esc_infer::persist::save_output;
use esc_infer::pipeline::{classify, RunOptions};
use esc_infer::{vocab, OnnxModel};

/// Exit status for every failure, the unsigned form of -1.
const FAILURE: u8 = 255;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("===   Environmental Sound Classifier   ===");

    // Load optional config
    let config = if let Some(config_path) = &cli.config {
        Config::from_yaml_file(config_path)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))?
    } else {
        Config::default()
    };

    let config = config
        .with_overrides(cli.top_k, cli.precision)
        .context("Invalid report options")?;
    let top_k = config.report.top_k;
    let precision = config.report.precision;
    debug!(
        "vocabulary: {} classes, top_k: {}, precision: {}",
        vocab::len(),
        top_k,
        precision
    );

    let model = OnnxModel::load(&cli.model)
        .with_context(|| format!("Failed to load model: {}", cli.model.display()))?;

    let Some(inputs_path) = &cli.inputs else {
        info!("No inputs given, model loaded only");
        return Ok(());
    };

    let container = InputContainer::open(inputs_path)
        .with_context(|| format!("Failed to load inputs: {}", inputs_path.display()))?;

    let options = RunOptions {
        sample_shape: config.inputs.sample_shape,
        top_k,
    };
    let run = classify(&model, &container, &options)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Text => run.report.write_text(&mut out, precision)?,
        OutputFormat::Json => run.report.write_json(&mut out, false)?,
        OutputFormat::Pretty => run.report.write_json(&mut out, true)?,
    }
    out.flush()?;

    if let Some(outputs_path) = &cli.outputs {
        save_output(&run.output, outputs_path)?;
    }

    Ok(())
}
