//! esc-infer: run an exported Environmental Sound Classifier on a batch of samples.
//!
//! This crate loads an ONNX classifier, stacks the named buffers of a NumPy
//! `.npz` archive into one batch, runs a single forward pass and reports the
//! most likely class for every buffer. Graph execution is delegated to
//! [`tract`](https://github.com/sonos/tract); everything on the host side is
//! plain `ndarray`.
//!
//! # Example
//!
//! ```ignore
//! use esc_infer::inputs::InputContainer;
//! use esc_infer::pipeline::{classify, RunOptions};
//! use esc_infer::OnnxModel;
//!
//! let model = OnnxModel::load("esc50.onnx")?;
//! let container = InputContainer::open("inputs.npz")?;
//!
//! let run = classify(&model, &container, &RunOptions::default())?;
//! run.report.write_text(&mut std::io::stdout(), 2)?;
//! esc_infer::persist::save_output(&run.output, "outputs.npy")?;
//! ```
//!
//! # Vocabulary
//!
//! Class names are compiled in from `assets/vocab.txt` by the build script.
//! Set `ESC_VOCAB` at build time to use a different label file.

pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod inputs;
pub mod persist;
pub mod pipeline;
pub mod report;
pub mod tensor;
pub mod vocab;

// Re-export commonly used types
pub use error::{EscError, Result};
pub use inference::{InferenceResult, ModelRunner, OnnxModel};
pub use tensor::TensorData;
