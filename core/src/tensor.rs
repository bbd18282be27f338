//! Host-side tensor helpers shared by the pipeline stages.

use ndarray::{Array2, ArrayD, Ix2};

use crate::error::{EscError, Result};

/// Tensor data produced by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorData {
    /// The tensor data as a dynamic-dimensional array.
    pub data: ArrayD<f32>,
}

impl TensorData {
    /// Wrap an owned array.
    pub fn new(data: ArrayD<f32>) -> Self {
        Self { data }
    }

    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Get the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Get the total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the tensor is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View the tensor as a `[batch, classes]` score matrix.
    pub fn to_matrix(&self) -> Result<Array2<f32>> {
        self.data
            .clone()
            .into_dimensionality::<Ix2>()
            .map_err(|_| {
                EscError::tensor(format!(
                    "expected a [batch, classes] output, got shape {}",
                    format_shape(self.shape())
                ))
            })
    }
}

/// Render a shape as `[d0, d1, ...]`.
pub fn format_shape(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("[{}]", dims.join(", "))
}
