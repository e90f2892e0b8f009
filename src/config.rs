use crate::eval::{DatasetLayout, PredictionSource, ReportFormat};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mleval: MlevalConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub combine: CombineConfig,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
pub struct MlevalConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for MlevalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Which files are compared and under which names
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Dataset split between the stem and the suffixes (`toy.test.lr.pred`).
    #[serde(default = "default_split")]
    pub split: String,
    /// Suffix of the ground-truth label file (`toy.test.pred`).
    #[serde(default = "default_truth_suffix")]
    pub truth_suffix: String,
    #[serde(default = "PredictionSource::builtin")]
    pub sources: Vec<PredictionSource>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            split: default_split(),
            truth_suffix: default_truth_suffix(),
            sources: PredictionSource::builtin(),
        }
    }
}

impl EvaluationConfig {
    pub fn layout(&self) -> DatasetLayout {
        DatasetLayout::new(self.split.clone(), self.truth_suffix.clone())
    }
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

/// Per-label prediction combination
#[derive(Debug, Clone, Deserialize)]
pub struct CombineConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_split() -> String {
    "test".to_string()
}

fn default_truth_suffix() -> String {
    "pred".to_string()
}

fn default_threshold() -> f64 {
    0.5
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in MLEVAL_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory (built-in defaults if absent)
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        if let Ok(path) = std::env::var("MLEVAL_CONFIG") {
            return Self::load_from(Path::new(&path));
        }

        let default_path = PathBuf::from("config.toml");
        if default_path.exists() {
            Self::load_from(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.evaluation.sources.is_empty() {
            anyhow::bail!("evaluation.sources must list at least one prediction source");
        }

        let mut names = HashSet::new();
        for source in &self.evaluation.sources {
            if source.name.trim().is_empty() || source.suffix.trim().is_empty() {
                anyhow::bail!("evaluation.sources entries need a non-empty name and suffix");
            }
            if !names.insert(source.name.as_str()) {
                anyhow::bail!("duplicate prediction source: {}", source.name);
            }
        }

        if self.evaluation.split.trim().is_empty() {
            anyhow::bail!("evaluation.split must not be empty");
        }

        if !(0.0..=1.0).contains(&self.combine.threshold) {
            anyhow::bail!("combine.threshold must be between 0.0 and 1.0");
        }

        Ok(())
    }

    /// Configured sources, optionally narrowed to the names/suffixes in `only`.
    pub fn select_sources(&self, only: &[String]) -> Result<Vec<PredictionSource>> {
        if only.is_empty() {
            return Ok(self.evaluation.sources.clone());
        }
        only.iter()
            .map(|key| {
                self.evaluation
                    .sources
                    .iter()
                    .find(|s| s.matches(key))
                    .cloned()
                    .with_context(|| format!("Unknown prediction source: {}", key))
            })
            .collect()
    }
}
