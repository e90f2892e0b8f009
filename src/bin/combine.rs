//! Combine per-label binary classifier outputs (`S.test.pred.1` .. `S.test.pred.L`)
//! into one multi-label prediction file.

use anyhow::{Context, Result};
use clap::Parser;
use mleval::{
    combine::{combine_files, render_matrix},
    eval::write_output,
    Config,
};
use std::path::PathBuf;

/// Threshold per-label probabilities into a 0/1 label file.
#[derive(Parser, Debug)]
#[command(name = "combine", version)]
struct Args {
    /// Dataset stem (e.g. `data/yeast` for `data/yeast.test`).
    stem: PathBuf,

    /// Probability at or above which a label is predicted (overrides combine.threshold).
    #[arg(long)]
    threshold: Option<f64>,

    /// Config file (default: $MLEVAL_CONFIG, then ./config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the combined predictions here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
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

    let threshold = args.threshold.unwrap_or(config.combine.threshold);
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("threshold must be between 0.0 and 1.0, got {}", threshold);
    }

    let matrix = combine_files(&args.stem, &config.evaluation.split, threshold)
        .with_context(|| format!("Failed to combine predictions for {}", args.stem.display()))?;

    write_output(&render_matrix(&matrix), args.output.as_deref())?;
    Ok(())
}
