//! Gridfit: Pipeline Search CLI Tool
//!
//! A command-line tool for fitting a column-routed feature pipeline to a
//! labeled dataset and tuning it with cross-validated grid search.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use polars::prelude::*;

use gridfit::cli::{confirm_search, Cli};
use gridfit::model::Estimator;
use gridfit::pipeline::{
    infer_groups, load_dataset, train_test_split, ColumnGroup, Combiner, HandleUnknown,
    ImputeStrategy, Imputer, OneHotEncoder, Pipeline, ScaleMethod, Scaler, TransformChain,
};
use gridfit::report::{
    display_search_results, export_search_report, ReportParams, SearchReport,
};
use gridfit::search::{refit_best, GridSearch, ParamGrid, ParamPath, ParamValue};
use gridfit::utils::progress::{
    create_fit_bar, create_spinner, finish_with_success, finish_with_warning,
};
use gridfit::utils::styling::{
    print_banner, print_completion, print_config, print_info, print_step_header, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Print styled banner
    print_banner(env!("CARGO_PKG_VERSION"));

    // Print configuration card
    print_config(&cli.input, &cli.target, cli.folds, Some(cli.seed));

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");

    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(&cli.input, cli.infer_schema_length)?
        .collect()
        .map_err(|e| anyhow::anyhow!("Failed to collect dataset: {}", e))?;
    finish_with_success(&spinner, "Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", df.height());
    println!("      Columns: {}", df.width());
    print_step_time(step_start.elapsed());

    // Verify target column exists
    let column_names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    if !column_names.contains(&cli.target) {
        anyhow::bail!(
            "Target column '{}' not found in dataset. Available columns: {:?}",
            cli.target,
            column_names
        );
    }

    // Step 2: Split and assemble the pipeline
    print_step_header(2, "Assemble Pipeline");

    let (numeric, categorical) = resolve_groups(&cli, &df);
    print_info(&format!(
        "Numeric features: {}",
        format_columns(&numeric.columns)
    ));
    print_info(&format!(
        "Categorical features: {}",
        format_columns(&categorical.columns)
    ));

    let (train_df, holdout_df) = if cli.test_fraction > 0.0 {
        let (train, holdout) = train_test_split(&df, cli.test_fraction, cli.seed)?;
        (train, Some(holdout))
    } else {
        (df.clone(), None)
    };
    let train_target = train_df.column(&cli.target)?.clone();
    let feature_df = train_df.drop(&cli.target)?;

    let pipeline = build_pipeline(numeric, categorical);
    let grid = build_grid(&cli);
    print_success(&format!(
        "Pipeline assembled, {} candidate(s) in the grid",
        grid.len()
    ));

    // Step 3: Grid search with cross-validation
    print_step_header(3, "Grid Search");

    let search = GridSearch::new(cli.folds).with_seed(cli.seed);
    if !cli.no_confirm && !confirm_search(grid.len(), cli.folds)? {
        println!("Cancelled by user.");
        return Ok(());
    }

    let step_start = Instant::now();
    let pb = create_fit_bar(search.planned_fits(&grid) as u64, "Evaluating candidates");
    let summary = search.run(&pipeline, &grid, &feature_df, &train_target, Some(&pb))?;
    let failed = summary
        .ranked
        .iter()
        .filter(|r| r.outcome.mean_score().is_none())
        .count();
    if failed > 0 {
        finish_with_warning(
            &pb,
            &format!("Grid search complete, {} candidate(s) failed", failed),
        );
    } else {
        finish_with_success(&pb, "Grid search complete");
    }
    print_step_time(step_start.elapsed());

    // Step 4: Refit the best candidate and score the holdout
    print_step_header(4, "Refit Best Candidate");

    let step_start = Instant::now();
    let fitted = refit_best(&pipeline, &summary, &feature_df, &train_target)?
        .ok_or_else(|| anyhow::anyhow!("Every candidate failed; nothing to refit"))?;
    print_success("Best candidate refit on the full training split");

    let holdout_score = match &holdout_df {
        Some(holdout) => {
            let holdout_target = holdout.column(&cli.target)?.clone();
            let holdout_features = holdout.drop(&cli.target)?;
            let score = fitted.score(&holdout_features, &holdout_target)?;
            print_success(&format!("Holdout score: {:.4}", score));
            Some(score)
        }
        None => {
            print_info("No holdout split requested; skipping final score");
            None
        }
    };
    print_step_time(step_start.elapsed());

    // Display ranked results
    display_search_results(&summary);

    // Export the JSON report
    let report_path = cli.report_path();
    let report = SearchReport::build(ReportParams {
        summary: &summary,
        input_file: cli.input.display().to_string(),
        target_column: cli.target.clone(),
        seed: Some(cli.seed),
        holdout_score,
    });
    export_search_report(&report, &report_path)?;
    print_success(&format!("Report saved to {}", report_path.display()));

    // Final completion message
    print_completion();

    Ok(())
}

/// Resolve feature groups from CLI flags, falling back to dtype inference.
fn resolve_groups(cli: &Cli, df: &DataFrame) -> (ColumnGroup, ColumnGroup) {
    if cli.numeric.is_empty() && cli.categorical.is_empty() {
        return infer_groups(df, &cli.target);
    }
    (
        ColumnGroup::new("numeric", cli.numeric.clone()),
        ColumnGroup::new("categorical", cli.categorical.clone()),
    )
}

/// The standard two-branch pipeline: impute+scale numerics, impute+encode
/// categoricals, logistic regression on top.
///
/// Unknown categories at validation time encode as all zeros; a small
/// fold can miss a rare category and that must not sink the candidate.
fn build_pipeline(numeric: ColumnGroup, categorical: ColumnGroup) -> Pipeline {
    Pipeline::new()
        .stage(
            "features",
            Combiner::new()
                .branch(
                    numeric,
                    TransformChain::new()
                        .step("impute", Imputer::new(ImputeStrategy::Mean))
                        .step("scale", Scaler::new(ScaleMethod::Standard)),
                )
                .branch(
                    categorical,
                    TransformChain::new()
                        .step("impute", Imputer::new(ImputeStrategy::MostFrequent))
                        .step(
                            "encode",
                            OneHotEncoder::new().with_handle_unknown(HandleUnknown::Ignore),
                        ),
                ),
        )
        .predict_with("clf", Estimator::logistic())
}

/// Build the search grid from the CLI's strategy list, indicator flag,
/// and optional estimator penalties.
fn build_grid(cli: &Cli) -> ParamGrid {
    let mut grid = ParamGrid::new().add(
        ParamPath::branch_step("features", "numeric", "impute"),
        cli.strategies
            .iter()
            .cloned()
            .map(ParamValue::Strategy)
            .collect(),
    );

    if cli.search_indicator {
        grid = grid.add(
            ParamPath::branch_step("features", "numeric", "impute"),
            vec![
                ParamValue::AddIndicator(false),
                ParamValue::AddIndicator(true),
            ],
        );
    }

    if !cli.l2.is_empty() {
        grid = grid.add(
            ParamPath::estimator("clf"),
            cli.l2.iter().copied().map(ParamValue::L2).collect(),
        );
    }

    grid
}

fn format_columns(columns: &[String]) -> String {
    if columns.is_empty() {
        "(none)".to_string()
    } else {
        columns.join(", ")
    }
}

/// Print the elapsed time for a step
fn print_step_time(elapsed: std::time::Duration) {
    println!(
        "      {}",
        style(format!("done in {:.2}s", elapsed.as_secs_f64())).dim()
    );
}
