//! Build script for esc-infer.
//!
//! This script generates the class vocabulary table that maps model output
//! indices to class names. The table is compiled into the binary so the
//! program never has to locate a label file at runtime.
//!
//! # Label File Format
//!
//! - One class name per line, ordered by class index
//! - Lines starting with `#` and blank lines are ignored
//! - Surrounding whitespace is trimmed
//! - Duplicate names are rejected
//!
//! # Environment Variables
//!
//! - `ESC_VOCAB`: Path to an alternative label file (default: `assets/vocab.txt`)

use std::collections::HashSet;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse class names from the contents of a label file.
fn parse_vocab(content: &str) -> Result<Vec<String>, String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let name = line.trim();
        if name.is_empty() || name.starts_with('#') {
            continue;
        }
        if !seen.insert(name.to_string()) {
            return Err(format!(
                "duplicate class name '{}' on line {}",
                name,
                lineno + 1
            ));
        }
        names.push(name.to_string());
    }

    if names.is_empty() {
        return Err("label file contains no class names".to_string());
    }
    Ok(names)
}

/// Render the vocabulary as a Rust source fragment.
fn render_vocab(names: &[String], source: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Generated by build.rs from {}.", source.display());
    let _ = writeln!(out, "pub static VOCAB: [&str; {}] = [", names.len());
    for name in names {
        let _ = writeln!(out, "    {:?},", name);
    }
    out.push_str("];\n");
    out
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let vocab_path = env::var("ESC_VOCAB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| manifest_dir.join("assets/vocab.txt"));

    println!("cargo:rerun-if-changed={}", vocab_path.display());
    println!("cargo:rerun-if-env-changed=ESC_VOCAB");

    let content = fs::read_to_string(&vocab_path).unwrap_or_else(|e| {
        panic!(
            "Could not read label file {}: {}\n\
             Set ESC_VOCAB to a file with one class name per line.",
            vocab_path.display(),
            e
        )
    });

    let names = parse_vocab(&content)
        .unwrap_or_else(|e| panic!("Invalid label file {}: {}", vocab_path.display(), e));

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let generated = render_vocab(&names, &vocab_path);
    fs::write(out_dir.join("vocab.rs"), generated).expect("Failed to write generated vocab.rs");
}
