//! Multi-label evaluation metrics: exact match ratio, Jaccard accuracy,
//! Hamming loss, micro precision/recall/F-measure and macro F-measure.

use crate::error::{EvalError, Result};
use crate::labels::{LabelSet, LabelUniverse};
use serde::Serialize;
use std::fmt;
use std::ops::Add;

/// Confusion counts for one label, or summed over all labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tn: usize,
}

impl ConfusionCounts {
    /// Classify one (label, instance) pair by membership on each side.
    fn observe(self, in_truth: bool, in_prediction: bool) -> Self {
        match (in_truth, in_prediction) {
            (true, true) => Self { tp: self.tp + 1, ..self },
            (false, true) => Self { fp: self.fp + 1, ..self },
            (true, false) => Self { fn_: self.fn_ + 1, ..self },
            (false, false) => Self { tn: self.tn + 1, ..self },
        }
    }

    /// `2tp / (2tp + fp + fn)`, or `None` when tp, fp and fn are all zero.
    pub fn f_measure(&self) -> Option<f64> {
        let denominator = 2 * self.tp + self.fp + self.fn_;
        if denominator == 0 {
            return None;
        }
        Some((2 * self.tp) as f64 / denominator as f64)
    }
}

impl Add for ConfusionCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            tp: self.tp + other.tp,
            fp: self.fp + other.fp,
            fn_: self.fn_ + other.fn_,
            tn: self.tn + other.tn,
        }
    }
}

/// Summary statistics for one prediction source against the ground truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReport {
    pub exact_match_ratio: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub hamming_loss: f64,
    pub f1_micro: f64,
    pub f1_macro: f64,
    /// Number of instances evaluated (summed when averaging folds).
    pub instances: usize,
    /// Size of the label universe.
    pub labels: usize,
    /// Confusion counts summed over every (label, instance) pair.
    pub totals: ConfusionCounts,
    /// Confusion counts per label, indexed by label.
    pub per_label: Vec<ConfusionCounts>,
}

impl MetricReport {
    /// Average several reports (e.g. cross-validation folds) metric by metric.
    ///
    /// Scalars are arithmetic means; counts are summed. All reports must share
    /// the same label universe size.
    pub fn average(reports: &[MetricReport]) -> Result<MetricReport> {
        let first = reports
            .first()
            .ok_or_else(|| EvalError::EmptyInput("no reports to average".to_string()))?;

        if let Some(other) = reports.iter().find(|r| r.labels != first.labels) {
            return Err(EvalError::LengthMismatch {
                expected: first.labels,
                found: other.labels,
            });
        }

        let n = reports.len() as f64;
        let mean = |metric: fn(&MetricReport) -> f64| reports.iter().map(metric).sum::<f64>() / n;

        let per_label = (0..first.labels)
            .map(|j| {
                reports
                    .iter()
                    .fold(ConfusionCounts::default(), |acc, r| acc + r.per_label[j])
            })
            .collect();

        Ok(MetricReport {
            exact_match_ratio: mean(|r| r.exact_match_ratio),
            accuracy: mean(|r| r.accuracy),
            precision: mean(|r| r.precision),
            recall: mean(|r| r.recall),
            hamming_loss: mean(|r| r.hamming_loss),
            f1_micro: mean(|r| r.f1_micro),
            f1_macro: mean(|r| r.f1_macro),
            instances: reports.iter().map(|r| r.instances).sum(),
            labels: first.labels,
            totals: reports
                .iter()
                .fold(ConfusionCounts::default(), |acc, r| acc + r.totals),
            per_label,
        })
    }
}

impl fmt::Display for MetricReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Exact match ratio: {}", self.exact_match_ratio)?;
        writeln!(f, "Accuracy: {}", self.accuracy)?;
        writeln!(f, "Precision: {}", self.precision)?;
        writeln!(f, "Recall: {}", self.recall)?;
        writeln!(f, "Hamming loss: {}", self.hamming_loss)?;
        writeln!(f, "Microaverage F-measure: {}", self.f1_micro)?;
        writeln!(f, "Macroaverage F-measure: {}", self.f1_macro)
    }
}

fn check_in_universe(sets: &[LabelSet], labels: &LabelUniverse, side: &str) -> Result<()> {
    for (i, set) in sets.iter().enumerate() {
        if let Some(max) = set.max_label() {
            if !labels.contains(max) {
                return Err(EvalError::InvalidInput(format!(
                    "{} instance {} has label {} outside the universe of {} labels",
                    side,
                    i,
                    max,
                    labels.len()
                )));
            }
        }
    }
    Ok(())
}

/// Compare predicted label sets against the ground truth.
///
/// `ground_truth` and `predicted` are index-aligned by instance. Every label
/// of `labels` counts in the macro F-measure denominator, including labels
/// that never occur on either side (they contribute 0).
///
/// Micro precision, recall and F-measure are undefined when nothing was
/// predicted positive, nothing is truly positive, or there is no true
/// positive at all; those cases return `EvalError::DivisionByZero`.
pub fn measure(
    ground_truth: &[LabelSet],
    predicted: &[LabelSet],
    labels: &LabelUniverse,
) -> Result<MetricReport> {
    if ground_truth.len() != predicted.len() {
        return Err(EvalError::LengthMismatch {
            expected: ground_truth.len(),
            found: predicted.len(),
        });
    }
    if ground_truth.is_empty() {
        return Err(EvalError::EmptyInput("no instances to evaluate".to_string()));
    }
    if labels.is_empty() {
        return Err(EvalError::EmptyInput("label universe is empty".to_string()));
    }
    check_in_universe(ground_truth, labels, "ground truth")?;
    check_in_universe(predicted, labels, "prediction")?;

    let n = ground_truth.len();

    // Instance pass: exact matches, Jaccard sum, symmetric-difference sum.
    let (exact, jaccard, disagreements) = ground_truth.iter().zip(predicted).fold(
        (0usize, 0.0f64, 0usize),
        |(exact, jaccard, disagreements), (truth, prediction)| {
            let union = truth.union_len(prediction);
            let similarity = if union == 0 {
                1.0
            } else {
                truth.intersection_len(prediction) as f64 / union as f64
            };
            (
                exact + usize::from(truth == prediction),
                jaccard + similarity,
                disagreements + truth.symmetric_difference_len(prediction),
            )
        },
    );

    // Label pass: one confusion fold per label.
    let per_label: Vec<ConfusionCounts> = labels
        .labels()
        .map(|j| {
            ground_truth
                .iter()
                .zip(predicted)
                .fold(ConfusionCounts::default(), |counts, (truth, prediction)| {
                    counts.observe(truth.contains(j), prediction.contains(j))
                })
        })
        .collect();

    let totals = per_label
        .iter()
        .fold(ConfusionCounts::default(), |acc, counts| acc + *counts);

    let f1_macro =
        per_label.iter().filter_map(ConfusionCounts::f_measure).sum::<f64>() / labels.len() as f64;

    if totals.tp + totals.fp == 0 {
        return Err(EvalError::DivisionByZero("precision"));
    }
    if totals.tp + totals.fn_ == 0 {
        return Err(EvalError::DivisionByZero("recall"));
    }
    let precision = totals.tp as f64 / (totals.tp + totals.fp) as f64;
    let recall = totals.tp as f64 / (totals.tp + totals.fn_) as f64;
    if precision + recall == 0.0 {
        return Err(EvalError::DivisionByZero("micro F-measure"));
    }
    let f1_micro = 2.0 * precision * recall / (precision + recall);

    Ok(MetricReport {
        exact_match_ratio: exact as f64 / n as f64,
        accuracy: jaccard / n as f64,
        precision,
        recall,
        hamming_loss: disagreements as f64 / (labels.len() * n) as f64,
        f1_micro,
        f1_macro,
        instances: n,
        labels: labels.len(),
        totals,
        per_label,
    })
}
