//! Loading and running exported ONNX classifiers.
//!
//! This module wraps a `tract` execution plan behind a small safe interface:
//! load once, run once per batch.

use ndarray::{ArrayD, IxDyn};
use std::path::Path;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{EscError, Result};
use crate::tensor::{format_shape, TensorData};

type Plan = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Result of model inference.
#[derive(Debug)]
pub struct InferenceResult {
    /// Output tensors from the model.
    pub outputs: Vec<TensorData>,
    /// Inference latency in milliseconds.
    pub latency_ms: f64,
}

impl InferenceResult {
    /// The first output, which classifier graphs use for class scores.
    pub fn primary(&self) -> Result<&TensorData> {
        self.outputs
            .first()
            .ok_or_else(|| EscError::inference("model returned no outputs"))
    }

    /// Consume the result, keeping only the first output.
    pub fn into_primary(self) -> Result<TensorData> {
        self.outputs
            .into_iter()
            .next()
            .ok_or_else(|| EscError::inference("model returned no outputs"))
    }
}

/// ONNX model wrapper.
///
/// The graph is parsed, optimized and planned once at load time and is
/// immutable afterwards.
///
/// # Example
///
/// ```ignore
/// use esc_infer::inference::{ModelRunner, OnnxModel};
/// use ndarray::{ArrayD, IxDyn};
///
/// let model = OnnxModel::load("esc50.onnx")?;
/// let input = ArrayD::<f32>::zeros(IxDyn(&[4, 1, 128, 157]));
/// let result = model.infer(&input)?;
/// println!("took {:.2}ms", result.latency_ms);
/// ```
pub struct OnnxModel {
    plan: Plan,
}

impl OnnxModel {
    /// Load a model from an `.onnx` file.
    ///
    /// # Errors
    ///
    /// Returns [`EscError::FileNotFound`] if the file does not exist and
    /// [`EscError::ModelLoad`] if it cannot be parsed or planned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading ONNX module from '{}'...", path.display());
        if !path.exists() {
            return Err(EscError::FileNotFound(path.to_path_buf()));
        }

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.into_optimized())
            .map_err(|e| {
                EscError::model_load(format!("failed to load {}: {:#}", path.display(), e))
            })?;

        let this = Self::from_typed(model)?;
        info!("Loading ONNX module from '{}'...done", path.display());
        Ok(this)
    }

    /// Build a model from an in-memory typed graph.
    pub fn from_typed(model: TypedModel) -> Result<Self> {
        debug!(
            "planning graph with {} nodes, {} input(s)",
            model.nodes().len(),
            model.inputs.len()
        );
        let plan = model
            .into_runnable()
            .map_err(|e| EscError::model_load(format!("failed to plan graph: {:#}", e)))?;
        Ok(Self { plan })
    }

    /// Run inference on an input tensor.
    ///
    /// Latency covers the graph call only, not the tensor conversions.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn infer(&self, input: &ArrayD<f32>) -> Result<InferenceResult> {
        let contiguous = input.as_standard_layout();
        let data = contiguous
            .as_slice()
            .ok_or_else(|| EscError::tensor("input is not contiguous"))?;
        let tensor = Tensor::from_shape(input.shape(), data)
            .map_err(|e| EscError::tensor(format!("failed to create input tensor: {:#}", e)))?;

        let start = Instant::now();
        let values = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| EscError::inference(format!("{:#}", e)))?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        if values.len() > 1 {
            warn!(
                "model returned {} outputs, only the first is used",
                values.len()
            );
        }

        let outputs = values
            .iter()
            .map(|value| extract_tensor(value))
            .collect::<Result<Vec<_>>>()?;

        Ok(InferenceResult {
            outputs,
            latency_ms,
        })
    }
}

/// Copy a runtime tensor into an owned `f32` array.
fn extract_tensor(value: &Tensor) -> Result<TensorData> {
    let value = value
        .cast_to::<f32>()
        .map_err(|e| EscError::tensor(format!("output is not numeric: {:#}", e)))?;
    let shape = value.shape().to_vec();
    let data = value
        .as_slice::<f32>()
        .map_err(|e| EscError::tensor(format!("{:#}", e)))?
        .to_vec();

    let array = ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| {
        EscError::tensor(format!(
            "array shape error for {}: {}",
            format_shape(&shape),
            e
        ))
    })?;

    Ok(TensorData::new(array))
}

/// Trait for types that can run model inference.
///
/// The pipeline is written against this trait so any callable graph can be
/// plugged in.
pub trait ModelRunner {
    /// Run inference on an input tensor.
    fn infer(&self, input: &ArrayD<f32>) -> Result<InferenceResult>;
}

impl ModelRunner for OnnxModel {
    fn infer(&self, input: &ArrayD<f32>) -> Result<InferenceResult> {
        OnnxModel::infer(self, input)
    }
}
