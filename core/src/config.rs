//! Configuration types for esc-infer.

use serde::Deserialize;

use crate::error::{EscError, Result};

/// Largest number of decimals accepted for reported probabilities.
pub const MAX_PRECISION: usize = 8;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Input aggregation configuration.
    #[serde(default)]
    pub inputs: InputConfig,

    /// Report configuration.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Input aggregation configuration.
#[derive(Debug, Default, Deserialize)]
pub struct InputConfig {
    /// Per-sample shape every named buffer must have, e.g. `[1, 128, 157]`.
    ///
    /// When unset, the shape of the first buffer is used.
    #[serde(default)]
    pub sample_shape: Option<Vec<usize>>,
}

/// Report configuration.
#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    /// Number of ranked classes shown per sample.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Decimals printed for probabilities.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            precision: default_precision(),
        }
    }
}

fn default_top_k() -> usize {
    1
}

fn default_precision() -> usize {
    2
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides and validate the merged result.
    pub fn with_overrides(
        mut self,
        top_k: Option<usize>,
        precision: Option<usize>,
    ) -> Result<Self> {
        if let Some(top_k) = top_k {
            self.report.top_k = top_k;
        }
        if let Some(precision) = precision {
            self.report.precision = precision;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.report.top_k == 0 {
            return Err(EscError::config("report.top_k must be at least 1"));
        }
        if self.report.precision > MAX_PRECISION {
            return Err(EscError::config(format!(
                "report.precision must be at most {}",
                MAX_PRECISION
            )));
        }
        if let Some(shape) = &self.inputs.sample_shape {
            if shape.iter().any(|&d| d == 0) {
                return Err(EscError::config(format!(
                    "inputs.sample_shape has a zero dimension: {:?}",
                    shape
                )));
            }
        }
        Ok(())
    }
}
