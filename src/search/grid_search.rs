//! Exhaustive grid search with k-fold cross-validation
//!
//! Every path/value pair in the grid is validated against the pipeline
//! before any fitting starts, so the expensive phase only ever sees
//! well-typed candidates. Candidates are independent and evaluate in
//! parallel; a candidate whose fit fails on real data is recorded as
//! failed and ranked last instead of aborting the search.

use std::time::Instant;

use indicatif::ProgressBar;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

use crate::pipeline::error::SearchError;
use crate::pipeline::pipeline::{FittedPipeline, Pipeline};
use crate::search::cv::KFold;
use crate::search::params::{Candidate, ParamGrid};

/// Per-candidate evaluation result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CandidateOutcome {
    /// All folds fit and scored.
    Scored {
        fold_scores: Vec<f64>,
        mean_score: f64,
        std_score: f64,
        eval_millis: u64,
    },
    /// At least one fold failed; the candidate ranks below every scored one.
    Failed { error: String },
}

impl CandidateOutcome {
    pub fn mean_score(&self) -> Option<f64> {
        match self {
            CandidateOutcome::Scored { mean_score, .. } => Some(*mean_score),
            CandidateOutcome::Failed { .. } => None,
        }
    }
}

/// One ranked row of the search result.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResult {
    pub params: Candidate,
    pub outcome: CandidateOutcome,
}

/// The full, ranked result of a grid search.
#[derive(Debug, Serialize)]
pub struct SearchSummary {
    /// Candidates ranked best-first; failed candidates trail all scored ones.
    pub ranked: Vec<CandidateResult>,
    pub total_candidates: usize,
    pub folds: usize,
    /// Total fits performed: candidates × folds.
    pub total_fits: usize,
    pub elapsed_secs: f64,
}

impl SearchSummary {
    /// The best scored candidate, if any candidate scored at all.
    pub fn best(&self) -> Option<&CandidateResult> {
        self.ranked
            .first()
            .filter(|c| matches!(c.outcome, CandidateOutcome::Scored { .. }))
    }
}

/// Grid search configuration: fold count and optional shuffle seed.
#[derive(Debug, Clone, Copy)]
pub struct GridSearch {
    kfold: KFold,
}

impl GridSearch {
    pub fn new(folds: usize) -> Self {
        Self {
            kfold: KFold::new(folds),
        }
    }

    /// Shuffle rows before folding, reproducibly.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.kfold = self.kfold.with_seed(seed);
        self
    }

    pub fn folds(&self) -> usize {
        self.kfold.folds()
    }

    /// Number of fits a search over `grid` would perform.
    pub fn planned_fits(&self, grid: &ParamGrid) -> usize {
        grid.len() * self.kfold.folds()
    }

    /// Evaluate every grid combination with k-fold cross-validation and
    /// return candidates ranked by mean validation score.
    ///
    /// The progress bar, when given, advances once per completed fold.
    pub fn run(
        &self,
        pipeline: &Pipeline,
        grid: &ParamGrid,
        df: &DataFrame,
        target: &Column,
        progress: Option<&ProgressBar>,
    ) -> Result<SearchSummary, SearchError> {
        if !pipeline.has_estimator() {
            return Err(SearchError::NoEstimator);
        }
        if grid.is_empty() {
            return Err(SearchError::EmptyGrid);
        }

        // Fail fast: every path/value pair must resolve and type-check
        // before a single fit runs.
        for (path, values) in grid.dims() {
            let mut probe = pipeline.clone();
            for value in values {
                probe.set_param(path, value)?;
            }
        }

        let splits = self.kfold.split(df.height())?;
        let candidates = grid.combinations();
        let started = Instant::now();

        let results: Vec<CandidateResult> = candidates
            .into_par_iter()
            .map(|candidate| {
                let outcome = self.evaluate(pipeline, &candidate, df, target, &splits, progress);
                CandidateResult {
                    params: candidate,
                    outcome,
                }
            })
            .collect();

        let mut ranked = results;
        // Stable sort: ties keep enumeration order, failures sink to the end.
        ranked.sort_by(|a, b| match (a.outcome.mean_score(), b.outcome.mean_score()) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        Ok(SearchSummary {
            total_candidates: ranked.len(),
            folds: self.kfold.folds(),
            total_fits: ranked.len() * splits.len(),
            elapsed_secs: started.elapsed().as_secs_f64(),
            ranked,
        })
    }

    fn evaluate(
        &self,
        pipeline: &Pipeline,
        candidate: &Candidate,
        df: &DataFrame,
        target: &Column,
        splits: &[crate::search::cv::FoldIndices],
        progress: Option<&ProgressBar>,
    ) -> CandidateOutcome {
        let configured = match apply_candidate(pipeline, candidate) {
            Ok(p) => p,
            Err(err) => {
                return CandidateOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };

        let started = Instant::now();
        let mut fold_scores = Vec::with_capacity(splits.len());
        for split in splits {
            let score = fit_and_score_fold(&configured, df, target, split);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            match score {
                Ok(score) => fold_scores.push(score),
                Err(err) => {
                    // Remaining folds of a failed candidate are skipped;
                    // keep the bar consistent with the planned total.
                    if let Some(pb) = progress {
                        pb.inc((splits.len() - fold_scores.len() - 1) as u64);
                    }
                    return CandidateOutcome::Failed {
                        error: err.to_string(),
                    };
                }
            }
        }

        let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        let variance = fold_scores
            .iter()
            .map(|s| (s - mean_score).powi(2))
            .sum::<f64>()
            / fold_scores.len() as f64;

        CandidateOutcome::Scored {
            fold_scores,
            mean_score,
            std_score: variance.sqrt(),
            eval_millis: started.elapsed().as_millis() as u64,
        }
    }
}

/// Apply one candidate's overrides to a fresh clone of the pipeline.
pub fn apply_candidate(pipeline: &Pipeline, candidate: &Candidate) -> Result<Pipeline, SearchError> {
    let mut configured = pipeline.clone();
    for (path, value) in candidate {
        configured.set_param(path, value)?;
    }
    Ok(configured)
}

/// Refit the best candidate on the full training table.
pub fn refit_best(
    pipeline: &Pipeline,
    summary: &SearchSummary,
    df: &DataFrame,
    target: &Column,
) -> Result<Option<FittedPipeline>, SearchError> {
    let Some(best) = summary.best() else {
        return Ok(None);
    };
    let configured = apply_candidate(pipeline, &best.params)?;
    Ok(Some(configured.fit(df, Some(target))?))
}

fn fit_and_score_fold(
    pipeline: &Pipeline,
    df: &DataFrame,
    target: &Column,
    split: &crate::search::cv::FoldIndices,
) -> Result<f64, SearchError> {
    let train_idx = IdxCa::from_vec("train".into(), split.train.clone());
    let val_idx = IdxCa::from_vec("validation".into(), split.validation.clone());

    let train_df = df.take(&train_idx)?;
    let train_target = target.take(&train_idx)?;
    let val_df = df.take(&val_idx)?;
    let val_target = target.take(&val_idx)?;

    let fitted = pipeline.fit(&train_df, Some(&train_target))?;
    Ok(fitted.score(&val_df, &val_target)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Estimator;
    use crate::pipeline::chain::TransformChain;
    use crate::pipeline::combine::Combiner;
    use crate::pipeline::impute::{ImputeStrategy, Imputer};
    use crate::pipeline::router::ColumnGroup;
    use crate::pipeline::scale::{ScaleMethod, Scaler};
    use crate::search::params::{ParamPath, ParamValue};

    fn sample_frame() -> (DataFrame, Column) {
        let df = df! {
            "age" => [
                Some(22.0f64), None, Some(26.0), Some(35.0), Some(54.0),
                Some(2.0), Some(27.0), None, Some(14.0), Some(58.0),
            ],
            "fare" => [
                7.25f64, 71.28, 7.92, 53.1, 51.86, 21.07, 11.13, 30.07, 30.07, 26.55,
            ],
        }
        .unwrap();
        let target = Column::new("survived".into(), [0i32, 1, 1, 1, 0, 0, 1, 0, 1, 1]);
        (df, target)
    }

    fn sample_pipeline() -> Pipeline {
        Pipeline::new()
            .stage(
                "features",
                Combiner::new().branch(
                    ColumnGroup::new("numeric", vec!["age".into(), "fare".into()]),
                    TransformChain::new()
                        .step("impute", Imputer::new(ImputeStrategy::Mean))
                        .step("scale", Scaler::new(ScaleMethod::Standard)),
                ),
            )
            .predict_with("clf", Estimator::logistic())
    }

    fn sample_grid() -> ParamGrid {
        ParamGrid::new()
            .add(
                ParamPath::branch_step("features", "numeric", "impute"),
                vec![
                    ParamValue::Strategy(ImputeStrategy::Mean),
                    ParamValue::Strategy(ImputeStrategy::Median),
                ],
            )
            .add(
                ParamPath::branch_step("features", "numeric", "impute"),
                vec![
                    ParamValue::AddIndicator(false),
                    ParamValue::AddIndicator(true),
                ],
            )
    }

    #[test]
    fn test_search_evaluates_every_combination() {
        let (df, target) = sample_frame();
        let search = GridSearch::new(5).with_seed(42);
        let summary = search
            .run(&sample_pipeline(), &sample_grid(), &df, &target, None)
            .unwrap();

        assert_eq!(summary.total_candidates, 4);
        assert_eq!(summary.folds, 5);
        assert_eq!(summary.total_fits, 20);

        for candidate in &summary.ranked {
            match &candidate.outcome {
                CandidateOutcome::Scored { fold_scores, .. } => {
                    assert_eq!(fold_scores.len(), 5)
                }
                CandidateOutcome::Failed { error } => panic!("candidate failed: {}", error),
            }
        }
    }

    #[test]
    fn test_best_candidate_leads_the_ranking() {
        let (df, target) = sample_frame();
        let search = GridSearch::new(5).with_seed(42);
        let summary = search
            .run(&sample_pipeline(), &sample_grid(), &df, &target, None)
            .unwrap();

        let best = summary.best().unwrap();
        let best_mean = best.outcome.mean_score().unwrap();
        for candidate in &summary.ranked {
            if let Some(mean) = candidate.outcome.mean_score() {
                assert!(best_mean >= mean);
            }
        }
    }

    #[test]
    fn test_invalid_path_fails_before_any_fit() {
        let (df, target) = sample_frame();
        let grid = ParamGrid::new().add(
            ParamPath::branch_step("features", "numeric", "polish"),
            vec![ParamValue::Strategy(ImputeStrategy::Mean)],
        );

        let result = GridSearch::new(5).run(&sample_pipeline(), &grid, &df, &target, None);
        assert!(matches!(result, Err(SearchError::UnresolvedPath { .. })));
    }

    #[test]
    fn test_search_requires_an_estimator() {
        let (df, target) = sample_frame();
        let transform_only = Pipeline::new().stage(
            "features",
            TransformChain::new().step("scale", Scaler::new(ScaleMethod::MinMax)),
        );

        let result = GridSearch::new(5).run(&transform_only, &sample_grid(), &df, &target, None);
        assert!(matches!(result, Err(SearchError::NoEstimator)));
    }

    #[test]
    fn test_too_few_rows_for_folds_is_rejected() {
        let (df, target) = sample_frame();
        let small = df.head(Some(3));
        let small_target = target.slice(0, 3);

        let result =
            GridSearch::new(5).run(&sample_pipeline(), &sample_grid(), &small, &small_target, None);
        assert!(matches!(
            result,
            Err(SearchError::InvalidFolds { folds: 5, rows: 3 })
        ));
    }

    #[test]
    fn test_refit_best_trains_on_all_rows() {
        let (df, target) = sample_frame();
        let pipeline = sample_pipeline();
        let search = GridSearch::new(5).with_seed(42);
        let summary = search
            .run(&pipeline, &sample_grid(), &df, &target, None)
            .unwrap();

        let fitted = refit_best(&pipeline, &summary, &df, &target)
            .unwrap()
            .expect("at least one candidate scored");
        let preds = fitted.predict(&df).unwrap();
        assert_eq!(preds.len(), df.height());
    }
}
