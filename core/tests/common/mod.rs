//! Fixtures shared by the integration tests.
//!
//! ONNX models are protobuf messages; the Identity graph below is encoded by
//! hand so the tests need no Python toolchain.

#![allow(dead_code)]

use anyhow::Result;
use ndarray::{Array1, ArrayD};
use ndarray_npy::{NpzWriter, WritableElement};
use std::fs::File;
use std::path::Path;

use esc_infer::vocab;

fn varint(mut v: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn int_field(field: u64, value: u64, out: &mut Vec<u8>) {
    varint(field << 3, out);
    varint(value, out);
}

fn bytes_field(field: u64, bytes: &[u8], out: &mut Vec<u8>) {
    varint((field << 3) | 2, out);
    varint(bytes.len() as u64, out);
    out.extend_from_slice(bytes);
}

fn value_info(name: &str, dims: &[u64]) -> Vec<u8> {
    let mut shape = Vec::new();
    for &d in dims {
        let mut dim = Vec::new();
        int_field(1, d, &mut dim); // dim_value
        bytes_field(1, &dim, &mut shape);
    }

    let mut tensor_type = Vec::new();
    int_field(1, 1, &mut tensor_type); // elem_type = FLOAT
    bytes_field(2, &shape, &mut tensor_type);

    let mut type_proto = Vec::new();
    bytes_field(1, &tensor_type, &mut type_proto);

    let mut info = Vec::new();
    bytes_field(1, name.as_bytes(), &mut info);
    bytes_field(2, &type_proto, &mut info);
    info
}

/// Serialized ONNX model computing `y = Identity(x)` for a fixed float shape.
pub fn identity_onnx(dims: &[u64]) -> Vec<u8> {
    let mut node = Vec::new();
    bytes_field(1, b"x", &mut node);
    bytes_field(2, b"y", &mut node);
    bytes_field(3, b"identity", &mut node);
    bytes_field(4, b"Identity", &mut node);

    let mut graph = Vec::new();
    bytes_field(1, &node, &mut graph);
    bytes_field(2, b"identity", &mut graph);
    bytes_field(11, &value_info("x", dims), &mut graph);
    bytes_field(12, &value_info("y", dims), &mut graph);

    let mut opset = Vec::new();
    int_field(2, 13, &mut opset);

    let mut model = Vec::new();
    int_field(1, 7, &mut model); // ir_version
    bytes_field(2, b"esc-infer-tests", &mut model);
    bytes_field(7, &graph, &mut model);
    bytes_field(8, &opset, &mut model);
    model
}

/// Write an Identity model for a `[batch, vocab]` input.
pub fn write_identity_model(path: &Path, batch: u64) -> Result<()> {
    std::fs::write(path, identity_onnx(&[batch, vocab::len() as u64]))?;
    Ok(())
}

/// A score vector whose maximum sits at `index`.
pub fn peaked(index: usize) -> ArrayD<f32> {
    let mut scores = Array1::<f32>::from_elem(vocab::len(), -1.0);
    scores[index] = 4.0;
    scores.into_dyn()
}

/// Write a `.npz` container with the given entries, in order.
pub fn write_npz<T: WritableElement>(path: &Path, entries: &[(&str, ArrayD<T>)]) -> Result<()> {
    let mut npz = NpzWriter::new(File::create(path)?);
    for (name, array) in entries {
        npz.add_array(*name, array)?;
    }
    npz.finish()?;
    Ok(())
}
