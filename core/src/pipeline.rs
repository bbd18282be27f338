//! The classification pipeline: aggregate, infer, report.

use tracing::info;

use crate::error::Result;
use crate::inference::ModelRunner;
use crate::inputs::{aggregate, InputContainer};
use crate::report::Report;
use crate::tensor::{format_shape, TensorData};

/// Options for one classification run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Required per-sample shape; derived from the first buffer when `None`.
    pub sample_shape: Option<Vec<usize>>,
    /// Ranked classes per sample, including the prediction.
    pub top_k: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            sample_shape: None,
            top_k: 1,
        }
    }
}

/// Everything a single run produces.
#[derive(Debug)]
pub struct RunOutput {
    /// Raw model output, `[batch, classes]`.
    pub output: TensorData,
    pub report: Report,
}

/// Stack the container's buffers, run the model once and build the report.
pub fn classify<R: ModelRunner + ?Sized>(
    model: &R,
    container: &InputContainer,
    options: &RunOptions,
) -> Result<RunOutput> {
    let batch = aggregate(container, options.sample_shape.as_deref())?;
    let batch_shape = batch.tensor.shape().to_vec();

    info!(
        "Running inference using stacked input tensor with shape {}...",
        format_shape(&batch_shape)
    );
    let result = model.infer(&batch.tensor)?;
    info!("Inference took {:.3} ms", result.latency_ms);

    let latency_ms = result.latency_ms;
    let output = result.into_primary()?;
    let report =
        Report::build(&output, &batch.labels, options.top_k)?.with_run_info(latency_ms, &batch_shape);

    Ok(RunOutput { output, report })
}
