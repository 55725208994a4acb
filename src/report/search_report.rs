//! Search result report generation
//!
//! Renders the ranked candidate table to the terminal and exports a
//! detailed JSON report documenting every candidate, its parameter
//! assignment, per-fold scores, and the run's settings.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use serde::Serialize;

use crate::search::{CandidateOutcome, SearchSummary};

/// One parameter assignment in string form, for readability in the report.
#[derive(Debug, Clone, Serialize)]
pub struct ParamEntry {
    pub path: String,
    pub value: String,
}

/// Single candidate entry in the report
#[derive(Debug, Clone, Serialize)]
pub struct CandidateEntry {
    pub rank: usize,
    pub status: String,
    pub params: Vec<ParamEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fold_scores: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_millis: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Settings used for the search run
#[derive(Debug, Clone, Serialize)]
pub struct SearchSettings {
    pub target_column: String,
    pub folds: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub gridfit_version: String,
    pub input_file: String,
    pub settings: SearchSettings,
}

/// Run-level summary
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_candidates: usize,
    pub total_fits: usize,
    pub scored: usize,
    pub failed: usize,
    pub elapsed_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holdout_score: Option<f64>,
}

/// Complete search report
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub metadata: ReportMetadata,
    pub summary: RunSummary,
    pub candidates: Vec<CandidateEntry>,
}

/// Parameters for building a SearchReport
pub struct ReportParams<'a> {
    pub summary: &'a SearchSummary,
    pub input_file: String,
    pub target_column: String,
    pub seed: Option<u64>,
    pub holdout_score: Option<f64>,
}

impl SearchReport {
    pub fn build(params: ReportParams<'_>) -> Self {
        let candidates: Vec<CandidateEntry> = params
            .summary
            .ranked
            .iter()
            .enumerate()
            .map(|(i, candidate)| {
                let param_entries = candidate
                    .params
                    .iter()
                    .map(|(path, value)| ParamEntry {
                        path: path.to_string(),
                        value: value.to_string(),
                    })
                    .collect();

                match &candidate.outcome {
                    CandidateOutcome::Scored {
                        fold_scores,
                        mean_score,
                        std_score,
                        eval_millis,
                    } => CandidateEntry {
                        rank: i + 1,
                        status: "scored".to_string(),
                        params: param_entries,
                        mean_score: Some(*mean_score),
                        std_score: Some(*std_score),
                        fold_scores: fold_scores.clone(),
                        eval_millis: Some(*eval_millis),
                        error: None,
                    },
                    CandidateOutcome::Failed { error } => CandidateEntry {
                        rank: i + 1,
                        status: "failed".to_string(),
                        params: param_entries,
                        mean_score: None,
                        std_score: None,
                        fold_scores: Vec::new(),
                        eval_millis: None,
                        error: Some(error.clone()),
                    },
                }
            })
            .collect();

        let scored = candidates.iter().filter(|c| c.status == "scored").count();

        SearchReport {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                gridfit_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: params.input_file,
                settings: SearchSettings {
                    target_column: params.target_column,
                    folds: params.summary.folds,
                    seed: params.seed,
                },
            },
            summary: RunSummary {
                total_candidates: candidates.len(),
                total_fits: params.summary.total_fits,
                scored,
                failed: candidates.len() - scored,
                elapsed_secs: params.summary.elapsed_secs,
                holdout_score: params.holdout_score,
            },
            candidates,
        }
    }
}

/// Render the ranked candidate table to the terminal.
pub fn display_search_results(summary: &SearchSummary) {
    println!();
    println!(
        "    {} {}",
        style("🏆").cyan(),
        style("SEARCH RESULTS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Parameters").add_attribute(Attribute::Bold),
        Cell::new("Mean Score").add_attribute(Attribute::Bold),
        Cell::new("Std").add_attribute(Attribute::Bold),
    ]);

    for (i, candidate) in summary.ranked.iter().enumerate() {
        let params: Vec<String> = candidate
            .params
            .iter()
            .map(|(path, value)| format!("{} {}", path, value))
            .collect();
        let params_cell = Cell::new(params.join("\n"));

        match &candidate.outcome {
            CandidateOutcome::Scored {
                mean_score,
                std_score,
                ..
            } => {
                let mut mean_cell = Cell::new(format!("{:.4}", mean_score));
                let mut rank_cell = Cell::new(i + 1);
                if i == 0 {
                    mean_cell = mean_cell.fg(Color::Green).add_attribute(Attribute::Bold);
                    rank_cell = rank_cell.fg(Color::Green).add_attribute(Attribute::Bold);
                }
                table.add_row(vec![
                    rank_cell,
                    params_cell,
                    mean_cell,
                    Cell::new(format!("{:.4}", std_score)),
                ]);
            }
            CandidateOutcome::Failed { error } => {
                table.add_row(vec![
                    Cell::new(i + 1).fg(Color::Red),
                    params_cell,
                    Cell::new("failed").fg(Color::Red),
                    Cell::new(truncate(error, 40)).fg(Color::Red),
                ]);
            }
        }
    }

    // Indent the table
    for line in table.to_string().lines() {
        println!("    {}", line);
    }

    println!();
    println!(
        "    {} {} candidates, {} fits, {:.2}s",
        style("⏱️").cyan(),
        summary.total_candidates,
        summary.total_fits,
        summary.elapsed_secs
    );
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}…", cut)
    }
}

/// Export the search report to a JSON file
pub fn export_search_report(report: &SearchReport, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize search report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write search report to {}", output_path.display()))?;

    Ok(())
}
