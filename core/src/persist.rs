//! Saving raw model output for later use.
//!
//! Output is written in NumPy format so it can be reloaded with
//! `numpy.load("outputs.npy")`. A path ending in `.npz` produces a one-entry
//! archive holding `output.npy`, the first and only array in the container.

use ndarray::{ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{read_npy, write_npy, NpzReader, NpzWriter};
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::error::{EscError, Result};
use crate::tensor::TensorData;

/// Entry name used for `.npz` output archives.
pub const OUTPUT_ENTRY: &str = "output.npy";

fn is_npz(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("npz"))
        .unwrap_or(false)
}

/// Write the raw output tensor to `path`.
///
/// # Errors
///
/// Returns [`EscError::Persist`] if the file cannot be created or written.
pub fn save_output(output: &TensorData, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    info!("Saving output tensor to '{}'", path.display());

    let persist_err = |e: &dyn std::fmt::Display| {
        EscError::persist(format!("{}: {}", path.display(), e))
    };

    if is_npz(path) {
        let file = File::create(path).map_err(|e| persist_err(&e))?;
        let mut npz = NpzWriter::new(file);
        npz.add_array(OUTPUT_ENTRY, &output.data)
            .map_err(|e| persist_err(&e))?;
        npz.finish().map_err(|e| persist_err(&e))?;
    } else {
        write_npy(path, &output.data).map_err(|e| persist_err(&e))?;
    }
    Ok(())
}

/// Read an output tensor written by [`save_output`].
///
/// For `.npz` files the first entry of the archive is returned.
///
/// # Errors
///
/// Returns [`EscError::Persist`] if the file is not a readable `f32` array or
/// the archive holds no entries.
pub fn load_output(path: impl AsRef<Path>) -> Result<TensorData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EscError::FileNotFound(path.to_path_buf()));
    }

    let load_err = |e: &dyn std::fmt::Display| {
        EscError::persist(format!("{}: {}", path.display(), e))
    };

    let data: ArrayD<f32> = if is_npz(path) {
        let file = File::open(path).map_err(|e| load_err(&e))?;
        let mut npz = NpzReader::new(file).map_err(|e| load_err(&e))?;
        let names = npz.names().map_err(|e| load_err(&e))?;
        let first = names
            .first()
            .ok_or_else(|| load_err(&"archive has no entries"))?;
        npz.by_name::<OwnedRepr<f32>, IxDyn>(first)
            .map_err(|e| load_err(&e))?
    } else {
        read_npy(path).map_err(|e| load_err(&e))?
    };

    Ok(TensorData::new(data))
}
