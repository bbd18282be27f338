//! Command-line interface for esc-infer.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Classify named spectrograms with an exported Environmental Sound Classifier.
#[derive(Parser, Debug)]
#[command(name = "esc-infer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the ONNX model to run.
    pub model: PathBuf,

    /// Path to a .npz archive of identically shaped named buffers.
    ///
    /// The buffers are stacked, in archive order, into a single batch tensor
    /// that is passed to the model. When omitted, only the model is loaded.
    pub inputs: Option<PathBuf>,

    /// Where to save the raw model output (.npy, or .npz for a one-entry archive).
    ///
    /// Reload in Python with `numpy.load("path/to/outputs.npy")`.
    pub outputs: Option<PathBuf>,

    /// Path to optional YAML config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of ranked classes to show per sample (overrides config).
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Decimals printed for probabilities (overrides config).
    #[arg(short, long)]
    pub precision: Option<usize>,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log debug details.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// How predictions are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per sample.
    Text,
    /// Compact JSON.
    Json,
    /// Indented JSON.
    Pretty,
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "esc_infer=debug"
        } else if self.quiet {
            "esc_infer=warn"
        } else {
            "esc_infer=info"
        }
    }
}
