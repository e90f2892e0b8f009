//! Evaluation framework: multi-label metrics, prediction sources, per-source
//! evaluation against one ground truth, and report rendering.

pub mod evaluator;
pub mod metrics;
pub mod report;
pub mod source;

pub use evaluator::{average_outcomes, MultiLabelEvaluator, SourceOutcome};
pub use metrics::{measure, ConfusionCounts, MetricReport};
pub use report::{render, write_output, ReportFormat, ReportSection};
pub use source::{DatasetLayout, PredictionSource};
