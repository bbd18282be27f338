//! Model inference module.
//!
//! This module loads exported ONNX graphs with `tract` and exposes
//! the [`ModelRunner`] seam the pipeline runs against.

mod model;

pub use model::{InferenceResult, ModelRunner, OnnxModel};
