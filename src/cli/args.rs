//! Command-line argument definitions using clap

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::pipeline::ImputeStrategy;

/// Gridfit - cross-validated hyperparameter search over feature pipelines
#[derive(Parser, Debug)]
#[command(name = "gridfit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target column name (binary 0/1 for classification)
    #[arg(short, long)]
    pub target: String,

    /// Numeric feature columns (comma-separated).
    /// If omitted, every non-target numeric column is used.
    #[arg(long, value_delimiter = ',')]
    pub numeric: Vec<String>,

    /// Categorical feature columns (comma-separated).
    /// If omitted, every non-target string/boolean column is used.
    #[arg(long, value_delimiter = ',')]
    pub categorical: Vec<String>,

    /// Imputation strategies to search over (comma-separated).
    /// Options: "mean", "median", "most_frequent"
    #[arg(long, value_delimiter = ',', default_value = "mean,median", value_parser = parse_strategy)]
    pub strategies: Vec<ImputeStrategy>,

    /// Also search over appending missing-value indicator columns
    /// (pass `--search-indicator false` to pin the grid to no indicators)
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub search_indicator: bool,

    /// L2 penalties to search over for the estimator (comma-separated).
    /// Empty keeps the estimator's default penalty out of the grid.
    #[arg(long, value_delimiter = ',')]
    pub l2: Vec<f64>,

    /// Number of cross-validation folds
    #[arg(long, default_value = "5", value_parser = validate_folds)]
    pub folds: usize,

    /// Seed for fold shuffling and the train/holdout split
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Fraction of rows held out for the final score (0 disables the holdout)
    #[arg(long, default_value = "0.2", value_parser = validate_test_fraction)]
    pub test_fraction: f64,

    /// Output path for the JSON search report.
    /// Defaults to the input directory with a '_search_report.json' suffix.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Get the report output path, deriving from input if not explicitly provided.
    pub fn report_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let parent = self
                .input
                .parent()
                .unwrap_or_else(|| std::path::Path::new("."));
            let stem = self
                .input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            parent.join(format!("{}_search_report.json", stem))
        })
    }
}

/// Parser for the strategies parameter
fn parse_strategy(s: &str) -> Result<ImputeStrategy, String> {
    s.parse()
}

/// Validator for the folds parameter
fn validate_folds(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid integer", s))?;

    if value < 2 {
        Err(format!("folds must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for the test_fraction parameter
fn validate_test_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..1.0).contains(&value) {
        Err(format!(
            "test_fraction must be in [0.0, 1.0), got {}",
            value
        ))
    } else {
        Ok(value)
    }
}
