//! Render evaluation outcomes as text or JSON and write them to a sink.

use crate::error::{EvalError, Result};
use crate::eval::evaluator::SourceOutcome;
use crate::eval::metrics::MetricReport;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

/// Output format for evaluation reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown report format: {} (expected text or json)", other)),
        }
    }
}

/// A titled group of outcomes, e.g. one dataset or the fold average.
#[derive(Debug)]
pub struct ReportSection {
    pub title: Option<String>,
    pub outcomes: Vec<SourceOutcome>,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    results: Vec<JsonOutcome<'a>>,
}

#[derive(Serialize)]
struct JsonOutcome<'a> {
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a MetricReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// One block per source: `<name>:`, the seven metric lines, a blank line.
pub fn render_text(sections: &[ReportSection]) -> String {
    let mut out = String::new();
    for section in sections {
        if let Some(title) = &section.title {
            let _ = writeln!(out, "== {} ==", title);
        }
        for outcome in &section.outcomes {
            let _ = writeln!(out, "{}:", outcome.source.name);
            match &outcome.result {
                Ok(report) => {
                    let _ = write!(out, "{}", report);
                }
                Err(e) => {
                    let _ = writeln!(out, "error: {}", e);
                }
            }
            out.push('\n');
        }
    }
    out
}

pub fn render_json(sections: &[ReportSection]) -> Result<String> {
    let json: Vec<JsonSection<'_>> = sections
        .iter()
        .map(|section| JsonSection {
            title: section.title.as_deref(),
            results: section
                .outcomes
                .iter()
                .map(|outcome| JsonOutcome {
                    source: &outcome.source.name,
                    report: outcome.result.as_ref().ok(),
                    error: outcome.result.as_ref().err().map(|e| e.to_string()),
                })
                .collect(),
        })
        .collect();

    let mut rendered = serde_json::to_string_pretty(&json)?;
    rendered.push('\n');
    Ok(rendered)
}

pub fn render(sections: &[ReportSection], format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(sections)),
        ReportFormat::Json => render_json(sections),
    }
}

/// Write rendered output to `path`, or to stdout when `path` is `None`.
pub fn write_output(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|e| {
                EvalError::Io(std::io::Error::new(
                    e.kind(),
                    format!("{}: {}", path.display(), e),
                ))
            })?;
            log::info!("Report written to {}", path.display());
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::metrics::measure;
    use crate::eval::source::PredictionSource;
    use crate::labels::{LabelSet, LabelUniverse};
    use tempfile::TempDir;

    fn sections() -> Vec<ReportSection> {
        let truth = vec![LabelSet::from([0]), LabelSet::from([1])];
        let report = measure(&truth, &truth.clone(), &LabelUniverse::new(2)).unwrap();
        vec![ReportSection {
            title: None,
            outcomes: vec![
                SourceOutcome {
                    source: PredictionSource::new("logistic regression", "lr"),
                    result: Ok(report),
                },
                SourceOutcome {
                    source: PredictionSource::new("CML", "cml"),
                    result: Err(EvalError::DivisionByZero("precision")),
                },
            ],
        }]
    }

    #[test]
    fn format_from_str() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("TEXT".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!("yaml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn text_report_layout() {
        let text = render_text(&sections());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "logistic regression:");
        assert_eq!(lines[1], "Exact match ratio: 1");
        assert_eq!(lines[7], "Macroaverage F-measure: 1");
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "CML:");
        assert_eq!(lines[10], "error: Division by zero computing precision");
    }

    #[test]
    fn text_report_titles() {
        let mut sections = sections();
        sections[0].title = Some("average over 2 folds".to_string());
        let text = render_text(&sections);
        assert!(text.starts_with("== average over 2 folds ==\n"));
    }

    #[test]
    fn json_report() {
        let rendered = render(&sections(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        let results = &value[0]["results"];
        assert_eq!(results[0]["source"], "logistic regression");
        assert_eq!(results[0]["report"]["exact_match_ratio"], 1.0);
        assert_eq!(results[0]["report"]["totals"]["fn"], 0);
        assert!(results[0].get("error").is_none());
        assert_eq!(results[1]["error"], "Division by zero computing precision");
        assert!(value[0].get("title").is_none());
    }

    #[test]
    fn writes_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.txt");
        write_output("Exact match ratio: 1\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Exact match ratio: 1\n");
    }
}
