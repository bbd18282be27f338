//! Input container loading and batch aggregation.
//!
//! An input container is a NumPy `.npz` archive whose entries are the named
//! sample buffers, e.g. written by `np.savez("inputs.npz", dog_01=a, rain_03=b)`.
//! Entries are enumerated in archive order, which is the order they were
//! written. Label alignment depends on that order, so it is never re-sorted.

use ndarray::{ArrayD, Axis, IxDyn};
use ndarray_npy::NpzReader;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{EscError, Result};
use crate::tensor::format_shape;

/// A labelled sample read from the input container.
#[derive(Debug, Clone)]
pub struct NamedBuffer {
    /// Entry name without the `.npy` suffix.
    pub name: String,
    /// Sample data.
    pub data: ArrayD<f32>,
}

impl NamedBuffer {
    pub fn new(name: impl Into<String>, data: ArrayD<f32>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// The named buffers of one input container, in archive order.
#[derive(Debug, Clone)]
pub struct InputContainer {
    path: PathBuf,
    buffers: Vec<NamedBuffer>,
}

impl InputContainer {
    /// Read every buffer of an `.npz` archive.
    ///
    /// `f32` entries are taken as-is and `f64` entries are narrowed to `f32`.
    ///
    /// # Errors
    ///
    /// Returns [`EscError::FileNotFound`] if `path` does not exist and
    /// [`EscError::Inputs`] if the archive or one of its entries is malformed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EscError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mut npz = NpzReader::new(file)
            .map_err(|e| EscError::inputs(format!("{}: {}", path.display(), e)))?;
        let names = npz
            .names()
            .map_err(|e| EscError::inputs(format!("{}: {}", path.display(), e)))?;

        let mut buffers = Vec::with_capacity(names.len());
        for entry in names {
            let data = read_entry(&mut npz, &entry)?;
            let name = entry.strip_suffix(".npy").unwrap_or(&entry).to_string();
            buffers.push(NamedBuffer { name, data });
        }

        Ok(Self {
            path: path.to_path_buf(),
            buffers,
        })
    }

    /// Build a container from buffers already in memory.
    pub fn from_buffers(path: impl Into<PathBuf>, buffers: Vec<NamedBuffer>) -> Self {
        Self {
            path: path.into(),
            buffers,
        }
    }

    /// Path the container was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Buffers in archive order.
    pub fn buffers(&self) -> &[NamedBuffer] {
        &self.buffers
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

fn read_entry(npz: &mut NpzReader<File>, entry: &str) -> Result<ArrayD<f32>> {
    match npz.by_name::<ndarray::OwnedRepr<f32>, IxDyn>(entry) {
        Ok(data) => Ok(data),
        Err(f32_err) => {
            debug!("entry '{}' is not f32 ({}), trying f64", entry, f32_err);
            npz.by_name::<ndarray::OwnedRepr<f64>, IxDyn>(entry)
                .map(|data| data.mapv(|v| v as f32))
                .map_err(|_| EscError::inputs(format!("entry '{}': {}", entry, f32_err)))
        }
    }
}

/// Samples stacked along a new leading axis, with their labels.
#[derive(Debug, Clone)]
pub struct Batch {
    /// `[n_samples] + sample_shape`.
    pub tensor: ArrayD<f32>,
    /// `labels[i]` names the buffer stacked at position `i`.
    pub labels: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Shape of a single sample.
    pub fn sample_shape(&self) -> &[usize] {
        &self.tensor.shape()[1..]
    }
}

/// Stack every buffer of `container` into one batch tensor.
///
/// The sample shape is `expected` when given, otherwise the shape of the first
/// buffer. All buffers are checked before anything is copied.
///
/// # Errors
///
/// - [`EscError::EmptyInput`] if the container has no buffers
/// - [`EscError::ShapeMismatch`] naming the first buffer with a different shape
pub fn aggregate(container: &InputContainer, expected: Option<&[usize]>) -> Result<Batch> {
    info!(
        "Inspecting '{}' for named buffers",
        container.path().display()
    );

    let buffers = container.buffers();
    let first = buffers
        .first()
        .ok_or_else(|| EscError::EmptyInput(container.path().to_path_buf()))?;
    let sample_shape = expected.unwrap_or_else(|| first.data.shape());

    for buffer in buffers {
        info!(
            "  - found buffer '{}' with shape {}",
            buffer.name,
            format_shape(buffer.data.shape())
        );
        if buffer.data.shape() != sample_shape {
            return Err(EscError::ShapeMismatch {
                name: buffer.name.clone(),
                expected: format_shape(sample_shape),
                actual: format_shape(buffer.data.shape()),
            });
        }
    }

    let mut batch_shape = Vec::with_capacity(sample_shape.len() + 1);
    batch_shape.push(buffers.len());
    batch_shape.extend_from_slice(sample_shape);

    let mut tensor = ArrayD::<f32>::zeros(IxDyn(&batch_shape));
    let mut labels = Vec::with_capacity(buffers.len());
    for (i, buffer) in buffers.iter().enumerate() {
        tensor.index_axis_mut(Axis(0), i).assign(&buffer.data);
        labels.push(buffer.name.clone());
    }

    Ok(Batch { tensor, labels })
}
