//! Compiled-in class vocabulary.
//!
//! `VOCAB` is generated by `build.rs` from `assets/vocab.txt`; index `i` is the
//! name of model output class `i`.

use crate::error::{EscError, Result};

include!(concat!(env!("OUT_DIR"), "/vocab.rs"));

/// Number of classes the vocabulary knows.
pub fn len() -> usize {
    VOCAB.len()
}

/// Resolve a class index to its name.
pub fn class_name(index: usize) -> Result<&'static str> {
    VOCAB.get(index).copied().ok_or(EscError::ClassOutOfRange {
        index,
        len: VOCAB.len(),
    })
}
