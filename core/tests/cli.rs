mod common;

use anyhow::Result;
use esc_infer::persist::load_output;
use esc_infer::vocab;
use std::path::Path;
use std::process::{Command, Output};

fn esc_infer(args: &[&Path]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_esc-infer"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()?)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn no_arguments_prints_usage_and_fails() -> Result<()> {
    let output = esc_infer(&[])?;
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(255));
    assert!(stderr(&output).contains("Usage"), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn model_only_loads_and_exits_cleanly() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("identity.onnx");
    common::write_identity_model(&model, 2)?;

    let output = esc_infer(&[&model])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn missing_model_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = esc_infer(&[&dir.path().join("nope.onnx")])?;
    assert_eq!(output.status.code(), Some(255));
    let log = stderr(&output);
    let loading = log.find("Loading ONNX module from").expect("no loading message");
    let missing = log.find("File not found").expect("no missing-file error");
    assert!(loading < missing, "stderr: {}", log);
    Ok(())
}

#[test]
fn malformed_model_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("broken.onnx");
    std::fs::write(&model, b"this is not an onnx model")?;

    let output = esc_infer(&[&model])?;
    assert_eq!(output.status.code(), Some(255));
    assert!(stderr(&output).contains("error:"));
    Ok(())
}

#[test]
fn full_run_prints_predictions_and_saves_output() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("identity.onnx");
    let inputs = dir.path().join("inputs.npz");
    let outputs = dir.path().join("outputs.npy");
    common::write_identity_model(&model, 2)?;
    common::write_npz(&inputs, &[("b", common::peaked(36)), ("a", common::peaked(18))])?;

    let output = esc_infer(&[&model, &inputs, &outputs])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3, "stdout: {}", text);
    assert!(lines[1].starts_with("  [#1] ('rain', 'b') "));
    assert!(lines[2].starts_with("  [#2] ('dog', 'a') "));

    let saved = load_output(&outputs)?;
    assert_eq!(saved.shape(), &[2, vocab::len()]);
    assert_eq!(saved.data[[0, 36]], 4.0);
    assert_eq!(saved.data[[1, 18]], 4.0);
    Ok(())
}

#[test]
fn empty_archive_fails_fast() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("identity.onnx");
    let inputs = dir.path().join("empty.npz");
    common::write_identity_model(&model, 2)?;
    common::write_npz::<f32>(&inputs, &[])?;

    let output = esc_infer(&[&model, &inputs])?;
    assert_eq!(output.status.code(), Some(255));
    assert!(stderr(&output).contains("No named buffers"));
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn mismatched_buffer_is_named() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("identity.onnx");
    let inputs = dir.path().join("inputs.npz");
    common::write_identity_model(&model, 2)?;
    let short = ndarray::ArrayD::<f32>::zeros(ndarray::IxDyn(&[7]));
    common::write_npz(&inputs, &[("good", common::peaked(1)), ("short", short)])?;

    let output = esc_infer(&[&model, &inputs])?;
    assert_eq!(output.status.code(), Some(255));
    assert!(stderr(&output).contains("Buffer 'short' has shape [7]"));
    Ok(())
}

#[test]
fn json_format_is_machine_readable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("identity.onnx");
    let inputs = dir.path().join("inputs.npz");
    common::write_identity_model(&model, 2)?;
    common::write_npz(&inputs, &[("p", common::peaked(34)), ("q", common::peaked(13))])?;

    let output = Command::new(env!("CARGO_BIN_EXE_esc-infer"))
        .args(["--format", "json", "--top-k", "2"])
        .arg(&model)
        .arg(&inputs)
        .env_remove("RUST_LOG")
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["batch_shape"], serde_json::json!([2, vocab::len()]));
    assert_eq!(value["predictions"][0]["class_name"], "pig");
    assert_eq!(value["predictions"][1]["class_name"], "cow");
    assert_eq!(value["predictions"][1]["runners_up"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[test]
fn out_of_range_report_options_fail() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("identity.onnx");
    common::write_identity_model(&model, 2)?;

    for args in [["--top-k", "0"], ["--precision", "20"]] {
        let output = Command::new(env!("CARGO_BIN_EXE_esc-infer"))
            .args(args)
            .arg(&model)
            .env_remove("RUST_LOG")
            .output()?;
        assert_eq!(output.status.code(), Some(255), "args: {:?}", args);
        assert!(stderr(&output).contains("Configuration error"), "stderr: {}", stderr(&output));
    }
    Ok(())
}
