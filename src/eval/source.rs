//! Prediction sources and the on-disk naming of their label files.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A named prediction method whose label file is compared to the ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PredictionSource {
    /// Display name used in reports (e.g. "logistic regression").
    pub name: String,
    /// File suffix identifying this method's predictions (e.g. "lr").
    pub suffix: String,
}

impl PredictionSource {
    pub fn new(name: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suffix: suffix.into(),
        }
    }

    /// The four methods compared by the experiment pipeline.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new("logistic regression", "lr"),
            Self::new("conditional random field", "crf"),
            Self::new("marginal conditional random field", "crf_marginal"),
            Self::new("CML", "cml"),
        ]
    }

    /// True if `key` names this source by display name or by suffix.
    pub fn matches(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key) || self.suffix == key
    }
}

/// How label files are named relative to a dataset stem.
///
/// With split `test` and truth suffix `pred`, stem `data/toy` maps to
/// `data/toy.test.pred` for the ground truth and `data/toy.test.lr.pred` for
/// the `lr` source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub split: String,
    pub truth_suffix: String,
}

impl DatasetLayout {
    pub fn new(split: impl Into<String>, truth_suffix: impl Into<String>) -> Self {
        Self {
            split: split.into(),
            truth_suffix: truth_suffix.into(),
        }
    }

    pub fn ground_truth_path(&self, stem: &Path) -> PathBuf {
        with_extension_chain(stem, &[&self.split, &self.truth_suffix])
    }

    pub fn prediction_path(&self, stem: &Path, source: &PredictionSource) -> PathBuf {
        with_extension_chain(stem, &[&self.split, &source.suffix, "pred"])
    }
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self::new("test", "pred")
    }
}

/// Append `.a.b.c` to a path without touching any existing extension.
pub(crate) fn with_extension_chain(stem: &Path, parts: &[&str]) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    for part in parts {
        name.push(".");
        name.push(part);
    }
    PathBuf::from(name)
}
