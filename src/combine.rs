//! Combine per-label binary classifier outputs into one multi-label
//! prediction file.
//!
//! A dataset `S` with `L` labels has a header file `S.test` whose first line is
//! `D N L` (instances, features, labels), and one output file per label,
//! `S.test.pred.1` .. `S.test.pred.L`, whose lines start with the probability
//! of that label being present.

use crate::error::{EvalError, Result};
use crate::eval::source::with_extension_chain;
use crate::labels::{LabelMatrix, LabelSet, LabelUniverse};
use std::path::{Path, PathBuf};

/// First line of a dataset file: `instances features labels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetHeader {
    pub instances: usize,
    pub features: usize,
    pub labels: usize,
}

impl DatasetHeader {
    pub fn parse(line: &str, origin: &str) -> Result<Self> {
        let fields: Vec<usize> = line
            .split_whitespace()
            .take(3)
            .map(|token| {
                token.parse::<usize>().map_err(|_| {
                    EvalError::Parse(format!("{} header: {:?} is not a count", origin, token))
                })
            })
            .collect::<Result<_>>()?;

        let [instances, features, labels] = fields[..] else {
            return Err(EvalError::Parse(format!(
                "{} header: expected \"instances features labels\", found {:?}",
                origin, line
            )));
        };

        if instances == 0 || labels == 0 {
            return Err(EvalError::EmptyInput(format!(
                "{} declares {} instances and {} labels",
                origin, instances, labels
            )));
        }

        Ok(Self {
            instances,
            features,
            labels,
        })
    }

    /// Read the header line of `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let content = read_to_string(path)?;
        let first = content.lines().next().unwrap_or("");
        Self::parse(first, &path.display().to_string())
    }
}

/// Path of the dataset file carrying the header (`S.<split>`).
pub fn dataset_path(stem: &Path, split: &str) -> PathBuf {
    with_extension_chain(stem, &[split])
}

/// Path of the binary classifier output for 1-based `label`.
pub fn binary_prediction_path(stem: &Path, split: &str, label: usize) -> PathBuf {
    with_extension_chain(stem, &[split, "pred", &label.to_string()])
}

/// Read the leading probability of the first `instances` lines.
pub fn parse_probabilities(content: &str, origin: &str, instances: usize) -> Result<Vec<f64>> {
    let probabilities: Vec<f64> = content
        .lines()
        .take(instances)
        .enumerate()
        .map(|(index, line)| {
            let token = line.split_whitespace().next().ok_or_else(|| {
                EvalError::Parse(format!("{} line {} is empty", origin, index + 1))
            })?;
            match token.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(EvalError::Parse(format!(
                    "{} line {}: {:?} is not a probability",
                    origin,
                    index + 1,
                    token
                ))),
            }
        })
        .collect::<Result<_>>()?;

    if probabilities.len() < instances {
        return Err(EvalError::LengthMismatch {
            expected: instances,
            found: probabilities.len(),
        });
    }
    Ok(probabilities)
}

/// Threshold per-label probability columns into label sets.
///
/// `columns[j][i]` is the probability of label `j` for instance `i`; a value
/// at or above `threshold` puts `j` in instance `i`'s set.
pub fn combine_predictions(columns: &[Vec<f64>], threshold: f64) -> Result<LabelMatrix> {
    let instances = columns
        .first()
        .map(Vec::len)
        .ok_or_else(|| EvalError::EmptyInput("no per-label predictions to combine".to_string()))?;

    if let Some(column) = columns.iter().find(|c| c.len() != instances) {
        return Err(EvalError::LengthMismatch {
            expected: instances,
            found: column.len(),
        });
    }

    let rows = (0..instances)
        .map(|i| -> LabelSet {
            columns
                .iter()
                .enumerate()
                .filter(|(_, column)| column[i] >= threshold)
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    Ok(LabelMatrix::new(LabelUniverse::new(columns.len()), rows))
}

/// Read the header and every per-label output file of `stem`, then combine.
pub fn combine_files(stem: &Path, split: &str, threshold: f64) -> Result<LabelMatrix> {
    let header = DatasetHeader::read(&dataset_path(stem, split))?;
    log::info!(
        "Combining {} labels over {} instances (threshold {})",
        header.labels,
        header.instances,
        threshold
    );

    let columns = (1..=header.labels)
        .map(|label| {
            let path = binary_prediction_path(stem, split, label);
            let content = read_to_string(&path)?;
            parse_probabilities(&content, &path.display().to_string(), header.instances)
        })
        .collect::<Result<Vec<_>>>()?;

    combine_predictions(&columns, threshold)
}

/// One line per instance of space-separated `0`/`1` tokens.
pub fn render_matrix(matrix: &LabelMatrix) -> String {
    let mut out = String::new();
    for row in matrix.rows() {
        let tokens: Vec<&str> = matrix
            .universe()
            .labels()
            .map(|j| if row.contains(j) { "1" } else { "0" })
            .collect();
        out.push_str(&tokens.join(" "));
        out.push('\n');
    }
    out
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        EvalError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_header_parse() {
        let header = DatasetHeader::parse("100 20 5", "toy.test").unwrap();
        assert_eq!(
            header,
            DatasetHeader {
                instances: 100,
                features: 20,
                labels: 5
            }
        );
    }

    #[test]
    fn test_header_rejects_malformed() {
        assert!(matches!(
            DatasetHeader::parse("100 20", "h").unwrap_err(),
            EvalError::Parse(_)
        ));
        assert!(matches!(
            DatasetHeader::parse("100 x 5", "h").unwrap_err(),
            EvalError::Parse(_)
        ));
        assert!(matches!(
            DatasetHeader::parse("0 20 5", "h").unwrap_err(),
            EvalError::EmptyInput(_)
        ));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let columns = vec![vec![0.5, 0.49], vec![0.9, 0.1]];
        let matrix = combine_predictions(&columns, 0.5).unwrap();
        assert_eq!(matrix.rows()[0], LabelSet::from([0, 1]));
        assert!(matrix.rows()[1].is_empty());
        assert_eq!(render_matrix(&matrix), "1 1\n0 0\n");
    }

    #[test]
    fn test_uneven_columns_fail() {
        let columns = vec![vec![0.5, 0.4], vec![0.9]];
        assert!(matches!(
            combine_predictions(&columns, 0.5).unwrap_err(),
            EvalError::LengthMismatch { expected: 2, found: 1 }
        ));
    }

    #[test]
    fn test_parse_probabilities() {
        let values = parse_probabilities("0.7 extra\n0.2\n0.9\n", "p", 2).unwrap();
        assert_eq!(values, vec![0.7, 0.2]);

        assert!(matches!(
            parse_probabilities("0.7\n", "p", 2).unwrap_err(),
            EvalError::LengthMismatch { expected: 2, found: 1 }
        ));
        assert!(matches!(
            parse_probabilities("0.7\nabc\n", "p", 2).unwrap_err(),
            EvalError::Parse(_)
        ));
        assert!(matches!(
            parse_probabilities("NaN\n", "p", 1).unwrap_err(),
            EvalError::Parse(_)
        ));
    }

    #[test]
    fn test_combine_files() {
        let temp_dir = TempDir::new().unwrap();
        let stem = temp_dir.path().join("toy");
        fs::write(dataset_path(&stem, "test"), "2 4 3\n0.1 0.2 0.3 0.4 1 0 0\n").unwrap();
        fs::write(binary_prediction_path(&stem, "test", 1), "0.8\n0.3\n").unwrap();
        fs::write(binary_prediction_path(&stem, "test", 2), "0.1\n0.6\n").unwrap();
        fs::write(binary_prediction_path(&stem, "test", 3), "0.5\n0.0\n").unwrap();

        let matrix = combine_files(&stem, "test", 0.5).unwrap();
        assert_eq!(matrix.universe().len(), 3);
        assert_eq!(render_matrix(&matrix), "1 0 1\n0 1 0\n");

        // The combined output parses back as a label file.
        let parsed = LabelMatrix::parse(&render_matrix(&matrix), "combined", Some(3)).unwrap();
        assert_eq!(parsed, matrix);
    }

    #[test]
    fn test_combine_files_missing_label_output() {
        let temp_dir = TempDir::new().unwrap();
        let stem = temp_dir.path().join("toy");
        fs::write(dataset_path(&stem, "test"), "1 1 2\n").unwrap();
        fs::write(binary_prediction_path(&stem, "test", 1), "0.8\n").unwrap();

        let err = combine_files(&stem, "test", 0.5).unwrap_err();
        assert!(matches!(err, EvalError::Io(_)));
        assert!(err.to_string().contains("toy.test.pred.2"));
    }
}
