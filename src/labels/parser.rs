use super::{LabelMatrix, LabelSet, LabelUniverse};
use crate::error::{EvalError, Result};
use std::path::Path;

/// Parse one whitespace-separated record of `0`/`1` tokens into a label set.
///
/// `origin` and `line` (1-based) are only used for error messages.
/// Any token other than exactly `0` or `1` is rejected.
pub fn parse_record(record: &str, origin: &str, line: usize) -> Result<(LabelSet, usize)> {
    let mut set = LabelSet::new();
    let mut width = 0;

    for (column, token) in record.split_whitespace().enumerate() {
        match token {
            "1" => {
                set.insert(column);
            }
            "0" => {}
            other => {
                return Err(EvalError::Parse(format!(
                    "{} line {} column {}: expected 0 or 1, found {:?}",
                    origin,
                    line,
                    column + 1,
                    other
                )));
            }
        }
        width = column + 1;
    }

    Ok((set, width))
}

impl LabelMatrix {
    /// Parse a whole label file.
    ///
    /// With `width == None` the first record establishes the label universe
    /// (ground truth). With `Some(width)` every record must have exactly that
    /// many tokens (prediction files). Records are never truncated or padded.
    pub fn parse(content: &str, origin: &str, width: Option<usize>) -> Result<Self> {
        let mut rows = Vec::new();
        let mut expected = width;

        for (index, record) in content.lines().enumerate() {
            let line = index + 1;
            let (set, found) = parse_record(record, origin, line)?;

            match expected {
                None => {
                    if found == 0 {
                        return Err(EvalError::EmptyInput(format!(
                            "{} line 1 has no labels; cannot establish the label universe",
                            origin
                        )));
                    }
                    expected = Some(found);
                }
                Some(expected) if expected != found => {
                    return Err(EvalError::ShapeMismatch {
                        origin: origin.to_string(),
                        line,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }

            rows.push(set);
        }

        let width = match expected {
            Some(width) if !rows.is_empty() => width,
            _ => {
                return Err(EvalError::EmptyInput(format!("{} contains no records", origin)));
            }
        };

        Ok(Self::new(LabelUniverse::new(width), rows))
    }
}

/// Read and parse a label file from disk.
///
/// Missing files surface as `EvalError::Io` carrying the path.
pub fn read_label_file(path: &Path, width: Option<usize>) -> Result<LabelMatrix> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        EvalError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;

    let matrix = LabelMatrix::parse(&content, &path.display().to_string(), width)?;
    log::info!(
        "Read {} instances x {} labels from {}",
        matrix.len(),
        matrix.universe().len(),
        path.display()
    );
    Ok(matrix)
}
