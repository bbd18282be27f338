//! Turning raw class scores into per-sample predictions.

use ndarray::{Array2, ArrayView1, Axis};
use serde::Serialize;
use std::io::Write;

use crate::error::{EscError, Result};
use crate::tensor::TensorData;
use crate::vocab;

/// Row-wise softmax over the class axis.
///
/// Each row has its maximum subtracted before exponentiating, which leaves the
/// result unchanged but keeps large scores from overflowing.
pub fn softmax_rows(scores: &Array2<f32>) -> Array2<f32> {
    let mut probs = scores.clone();
    for mut row in probs.axis_iter_mut(Axis(0)) {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    probs
}

/// Index of the largest value, the lowest index on ties.
///
/// Returns `None` for an empty row.
pub fn argmax(row: ArrayView1<'_, f32>) -> Option<usize> {
    row.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Class indices sorted by descending score, at most `k` of them.
fn ranked_classes(row: ArrayView1<'_, f32>, k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| row[b].total_cmp(&row[a]).then(a.cmp(&b)));
    order.truncate(k);
    order
}

/// A ranked class for one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedClass {
    pub class_index: usize,
    pub class_name: &'static str,
    pub probability: f32,
}

/// The prediction for one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Position in the batch, zero based.
    pub sample: usize,
    /// Name of the buffer the sample came from.
    pub label: String,
    pub class_index: usize,
    pub class_name: &'static str,
    pub probability: f32,
    /// Best classes after the first, when more than one was requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runners_up: Vec<RankedClass>,
}

/// Predictions for a whole batch, in sample order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub latency_ms: f64,
    pub batch_shape: Vec<usize>,
    pub predictions: Vec<Prediction>,
}

impl Report {
    /// Build a report from the raw model output.
    ///
    /// `top_k` is the number of ranked classes per sample, including the
    /// predicted one.
    ///
    /// # Errors
    ///
    /// - [`EscError::Tensor`] if the output is not `[labels.len(), classes]`
    ///   or holds a NaN or infinite score
    /// - [`EscError::VocabularyMismatch`] if `classes` is not the vocabulary size
    pub fn build(output: &TensorData, labels: &[String], top_k: usize) -> Result<Self> {
        let scores = output.to_matrix()?;
        let (rows, classes) = scores.dim();

        if rows != labels.len() {
            return Err(EscError::tensor(format!(
                "output has {} rows for {} samples",
                rows,
                labels.len()
            )));
        }
        if classes != vocab::len() {
            return Err(EscError::VocabularyMismatch {
                classes,
                vocab: vocab::len(),
            });
        }

        if let Some(r) = scores
            .axis_iter(Axis(0))
            .position(|row| row.iter().any(|v| !v.is_finite()))
        {
            return Err(EscError::tensor(format!(
                "output row {} contains non-finite scores",
                r
            )));
        }

        let probs = softmax_rows(&scores);
        let mut predictions = Vec::with_capacity(rows);

        let rows_iter = scores.axis_iter(Axis(0)).zip(probs.axis_iter(Axis(0)));
        for (sample, ((raw, row), label)) in rows_iter.zip(labels).enumerate() {
            let best = argmax(raw).ok_or_else(|| EscError::tensor("output has no classes"))?;

            let runners_up = ranked_classes(raw, top_k)
                .into_iter()
                .filter(|&i| i != best)
                .take(top_k.saturating_sub(1))
                .map(|i| {
                    Ok(RankedClass {
                        class_index: i,
                        class_name: vocab::class_name(i)?,
                        probability: row[i],
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            predictions.push(Prediction {
                sample,
                label: label.clone(),
                class_index: best,
                class_name: vocab::class_name(best)?,
                probability: row[best],
                runners_up,
            });
        }

        Ok(Self {
            latency_ms: 0.0,
            batch_shape: Vec::new(),
            predictions,
        })
    }

    /// Attach timing and input shape information.
    pub fn with_run_info(mut self, latency_ms: f64, batch_shape: &[usize]) -> Self {
        self.latency_ms = latency_ms;
        self.batch_shape = batch_shape.to_vec();
        self
    }

    /// Write one line per sample, followed by ranked runners-up.
    pub fn write_text<W: Write>(&self, out: &mut W, precision: usize) -> Result<()> {
        writeln!(out, "Output: [sample #] (prediction, label) p")?;
        for p in &self.predictions {
            writeln!(
                out,
                "  [#{}] ('{}', '{}') {:.*}",
                p.sample + 1,
                p.class_name,
                p.label,
                precision,
                p.probability
            )?;
            for (rank, r) in p.runners_up.iter().enumerate() {
                writeln!(
                    out,
                    "      [#{}] {} ({:.*})",
                    rank + 2,
                    r.class_name,
                    precision,
                    r.probability
                )?;
            }
        }
        Ok(())
    }

    /// Write the report as JSON.
    pub fn write_json<W: Write>(&self, out: &mut W, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut *out, self)?;
        } else {
            serde_json::to_writer(&mut *out, self)?;
        }
        writeln!(out)?;
        Ok(())
    }
}
