//! Error types for esc-infer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for esc-infer operations.
pub type Result<T> = std::result::Result<T, EscError>;

/// Errors that can occur while loading, running or reporting a classification.
#[derive(Debug, Error)]
pub enum EscError {
    /// Model loading failed.
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    /// The input container could not be read.
    #[error("Input loading failed: {0}")]
    Inputs(String),

    /// The input container holds no named buffers.
    #[error("No named buffers found in {}", .0.display())]
    EmptyInput(PathBuf),

    /// A named buffer does not have the expected sample shape.
    #[error("Buffer '{name}' has shape {actual}, expected {expected}")]
    ShapeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// Inference failed.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Invalid tensor.
    #[error("Invalid tensor: {0}")]
    Tensor(String),

    /// Model output width disagrees with the compiled-in vocabulary.
    #[error("Model produces {classes} classes but the vocabulary has {vocab}")]
    VocabularyMismatch { classes: usize, vocab: usize },

    /// A class index outside the vocabulary.
    #[error("Class index {index} out of range for vocabulary of {len}")]
    ClassOutOfRange { index: usize, len: usize },

    /// Writing the output tensor failed.
    #[error("Saving output failed: {0}")]
    Persist(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

impl EscError {
    /// Create a model load error.
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create an input loading error.
    pub fn inputs(msg: impl Into<String>) -> Self {
        Self::Inputs(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a tensor error.
    pub fn tensor(msg: impl Into<String>) -> Self {
        Self::Tensor(msg.into())
    }

    /// Create a persistence error.
    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
