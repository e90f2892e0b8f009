//! Evaluate every prediction source against one ground-truth label file.

use crate::error::{EvalError, Result};
use crate::eval::metrics::{measure, MetricReport};
use crate::eval::source::{DatasetLayout, PredictionSource};
use crate::labels::{read_label_file, LabelMatrix};
use std::path::Path;

/// Result of evaluating one prediction source.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: PredictionSource,
    pub result: Result<MetricReport>,
}

impl SourceOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Holds the ground truth for one dataset and scores predictions against it.
pub struct MultiLabelEvaluator {
    ground_truth: LabelMatrix,
}

impl MultiLabelEvaluator {
    pub fn new(ground_truth: LabelMatrix) -> Self {
        Self { ground_truth }
    }

    /// Load the ground truth; its first record fixes the label universe.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(read_label_file(path, None)?))
    }

    pub fn ground_truth(&self) -> &LabelMatrix {
        &self.ground_truth
    }

    pub fn evaluate(&self, predicted: &LabelMatrix) -> Result<MetricReport> {
        let universe = self.ground_truth.universe();
        if predicted.universe() != universe {
            return Err(EvalError::InvalidInput(format!(
                "prediction has {} labels but ground truth has {}",
                predicted.universe().len(),
                universe.len()
            )));
        }
        measure(self.ground_truth.rows(), predicted.rows(), &universe)
    }

    /// Parse a prediction file against the ground-truth width and score it.
    pub fn evaluate_file(&self, path: &Path) -> Result<MetricReport> {
        let predicted = read_label_file(path, Some(self.ground_truth.universe().len()))?;
        self.evaluate(&predicted)
    }

    /// Score each source independently. A failing source never affects the
    /// others; its error is carried in its outcome.
    pub fn evaluate_sources(
        &self,
        stem: &Path,
        layout: &DatasetLayout,
        sources: &[PredictionSource],
    ) -> Vec<SourceOutcome> {
        sources
            .iter()
            .map(|source| {
                let path = layout.prediction_path(stem, source);
                log::info!("Evaluating {} ({})", source.name, path.display());
                let result = self.evaluate_file(&path);
                match &result {
                    Ok(report) => log::debug!(
                        "{}: exact={:.4} hamming={:.4} f1_micro={:.4} f1_macro={:.4}",
                        source.name,
                        report.exact_match_ratio,
                        report.hamming_loss,
                        report.f1_micro,
                        report.f1_macro
                    ),
                    Err(e) => log::warn!("{} failed: {}", source.name, e),
                }
                SourceOutcome {
                    source: source.clone(),
                    result,
                }
            })
            .collect()
    }
}

/// Average per-source reports across folds.
///
/// `folds[k][i]` must be the outcome of `sources[i]` on fold `k`. A source
/// that failed on any fold has no average.
pub fn average_outcomes(sources: &[PredictionSource], folds: &[&[SourceOutcome]]) -> Vec<SourceOutcome> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let reports: Vec<MetricReport> = folds
                .iter()
                .filter_map(|fold| fold.get(i))
                .filter_map(|outcome| outcome.result.as_ref().ok().cloned())
                .collect();

            let result = if reports.len() == folds.len() {
                MetricReport::average(&reports)
            } else {
                Err(EvalError::InvalidInput(format!(
                    "{} of {} folds failed",
                    folds.len() - reports.len(),
                    folds.len()
                )))
            };

            SourceOutcome {
                source: source.clone(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_dataset(dir: &Path) -> std::path::PathBuf {
        let stem = dir.join("toy");
        fs::write(dir.join("toy.test.pred"), "1 1 0\n0 0 1\n0 0 0\n").unwrap();
        fs::write(dir.join("toy.test.lr.pred"), "1 1 0\n1 0 0\n0 0 0\n").unwrap();
        fs::write(dir.join("toy.test.crf.pred"), "1 1 0\n0 0 1\n0 0 0\n").unwrap();
        // Short record: two tokens against a width of three.
        fs::write(dir.join("toy.test.crf_marginal.pred"), "1 1 0\n1 0\n0 0 0\n").unwrap();
        stem
    }

    #[test]
    fn evaluates_each_source_in_isolation() {
        let temp_dir = TempDir::new().unwrap();
        let stem = write_dataset(temp_dir.path());
        let layout = DatasetLayout::default();

        let evaluator = MultiLabelEvaluator::from_file(&layout.ground_truth_path(&stem)).unwrap();
        let outcomes = evaluator.evaluate_sources(&stem, &layout, &PredictionSource::builtin());

        assert_eq!(outcomes.len(), 4);
        let lr = outcomes[0].result.as_ref().unwrap();
        assert!((lr.exact_match_ratio - 2.0 / 3.0).abs() < 1e-12);
        assert!((lr.hamming_loss - 2.0 / 9.0).abs() < 1e-12);

        let crf = outcomes[1].result.as_ref().unwrap();
        assert_eq!(crf.exact_match_ratio, 1.0);

        assert!(matches!(
            outcomes[2].result,
            Err(EvalError::ShapeMismatch { line: 2, expected: 3, found: 2, .. })
        ));
        // No cml file on disk.
        assert!(matches!(outcomes[3].result, Err(EvalError::Io(_))));
    }

    #[test]
    fn mismatched_record_count_fails() {
        let temp_dir = TempDir::new().unwrap();
        let truth = temp_dir.path().join("truth");
        let pred = temp_dir.path().join("pred");
        fs::write(&truth, "1 0\n0 1\n").unwrap();
        fs::write(&pred, "1 0\n").unwrap();

        let evaluator = MultiLabelEvaluator::from_file(&truth).unwrap();
        let err = evaluator.evaluate_file(&pred).unwrap_err();
        assert!(matches!(err, EvalError::LengthMismatch { expected: 2, found: 1 }));
    }

    #[test]
    fn universe_mismatch_fails() {
        let truth = LabelMatrix::parse("1 0\n", "truth", None).unwrap();
        let pred = LabelMatrix::parse("1 0 0\n", "pred", None).unwrap();
        let err = MultiLabelEvaluator::new(truth).evaluate(&pred).unwrap_err();
        assert!(matches!(err, EvalError::InvalidInput(_)));
    }

    #[test]
    fn averages_across_folds() {
        let temp_dir = TempDir::new().unwrap();
        let layout = DatasetLayout::default();
        let sources = vec![PredictionSource::new("logistic regression", "lr")];

        let mut folds = Vec::new();
        for (name, pred) in [("a", "1 0\n0 1\n"), ("b", "1 0\n1 1\n")] {
            let stem = temp_dir.path().join(name);
            fs::write(layout.ground_truth_path(&stem), "1 0\n0 1\n").unwrap();
            fs::write(layout.prediction_path(&stem, &sources[0]), pred).unwrap();
            let evaluator = MultiLabelEvaluator::from_file(&layout.ground_truth_path(&stem)).unwrap();
            folds.push(evaluator.evaluate_sources(&stem, &layout, &sources));
        }

        let folds: Vec<&[SourceOutcome]> = folds.iter().map(Vec::as_slice).collect();
        let summary = average_outcomes(&sources, &folds);
        let report = summary[0].result.as_ref().unwrap();
        assert!((report.exact_match_ratio - 0.75).abs() < 1e-12);
        assert_eq!(report.instances, 4);
    }

    #[test]
    fn failed_fold_has_no_average() {
        let temp_dir = TempDir::new().unwrap();
        let layout = DatasetLayout::default();
        let sources = vec![PredictionSource::new("CML", "cml")];

        let stem = temp_dir.path().join("only");
        fs::write(layout.ground_truth_path(&stem), "1 0\n").unwrap();
        let evaluator = MultiLabelEvaluator::from_file(&layout.ground_truth_path(&stem)).unwrap();
        let outcomes = evaluator.evaluate_sources(&stem, &layout, &sources);

        let summary = average_outcomes(&sources, &[outcomes.as_slice()]);
        assert!(!summary[0].is_ok());
    }
}
