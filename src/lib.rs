pub mod config;
pub mod error;
pub mod labels;
pub mod eval;
pub mod combine;

pub use config::Config;
pub use error::{EvalError, Result};
pub use eval::{measure, MetricReport, MultiLabelEvaluator, PredictionSource};
pub use labels::{LabelMatrix, LabelSet, LabelUniverse};
