//! Evaluation CLI: score every prediction source of one or more datasets
//! against their ground truth and report the multi-label metrics.

use anyhow::{Context, Result};
use clap::Parser;
use mleval::{
    eval::{average_outcomes, render, write_output, MultiLabelEvaluator, ReportFormat, ReportSection},
    Config,
};
use std::path::PathBuf;

/// Compare multi-label predictions against ground truth.
#[derive(Parser, Debug)]
#[command(name = "mleval", version)]
struct Args {
    /// Dataset stems (e.g. `data/yeast` for `data/yeast.test.pred`). Several
    /// stems are treated as folds and additionally averaged.
    #[arg(required = true)]
    stems: Vec<PathBuf>,

    /// Config file (default: $MLEVAL_CONFIG, then ./config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report format: text or json (overrides report.format).
    #[arg(long)]
    format: Option<ReportFormat>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Only evaluate this source (name or suffix); repeatable.
    #[arg(long = "source")]
    sources: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.mleval.log_level.as_str())
    ).init();

    let sources = config.select_sources(&args.sources)?;
    let layout = config.evaluation.layout();
    let format = args.format.unwrap_or(config.report.format);

    let mut sections = Vec::with_capacity(args.stems.len() + 1);
    for stem in &args.stems {
        let truth_path = layout.ground_truth_path(stem);
        let evaluator = MultiLabelEvaluator::from_file(&truth_path)
            .with_context(|| format!("Failed to load ground truth {}", truth_path.display()))?;

        log::info!(
            "Ground truth {}: {} instances, {} labels",
            truth_path.display(),
            evaluator.ground_truth().len(),
            evaluator.ground_truth().universe().len()
        );

        let outcomes = evaluator.evaluate_sources(stem, &layout, &sources);
        sections.push(ReportSection {
            title: (args.stems.len() > 1).then(|| stem.display().to_string()),
            outcomes,
        });
    }

    let failures: usize = sections
        .iter()
        .map(|s| s.outcomes.iter().filter(|o| !o.is_ok()).count())
        .sum();

    if sections.len() > 1 {
        let folds: Vec<_> = sections.iter().map(|s| s.outcomes.as_slice()).collect();
        let summary = average_outcomes(&sources, &folds);
        let fold_count = folds.len();
        sections.push(ReportSection {
            title: Some(format!("average over {} folds", fold_count)),
            outcomes: summary,
        });
    }

    let rendered = render(&sections, format)?;
    write_output(&rendered, args.output.as_deref())?;

    if failures > 0 {
        anyhow::bail!("{} source evaluation(s) failed", failures);
    }
    Ok(())
}
