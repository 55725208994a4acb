//! Error types for the pipeline and search layers.
//!
//! Configuration problems (unknown columns, unresolvable parameter paths)
//! are reported before any fitting work starts. Data problems name the
//! offending step and column so a failed branch can be located without
//! re-running the pipeline.

use thiserror::Error;

/// Errors raised while routing, fitting, or applying transform steps.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column group references a column that does not exist in the table.
    #[error("column '{column}' in group '{group}' not found in the dataset")]
    MissingColumn { group: String, column: String },

    /// Two column groups claim the same column without overlap being enabled.
    #[error("column '{column}' appears in more than one group (enable allow_overlap to permit this)")]
    OverlappingGroups { column: String },

    /// A step received a column with a data type it cannot operate on.
    #[error("step '{step}' cannot be applied to column '{column}' of type {dtype}")]
    IncompatibleDtype {
        step: String,
        column: String,
        dtype: String,
    },

    /// A statistic could not be learned because the column has no usable values.
    #[error("step '{step}' has no values to learn a statistic for column '{column}'")]
    NoStatistic { step: String, column: String },

    /// A step that requires complete data received nulls.
    #[error("step '{step}' received nulls in column '{column}'; impute before this step")]
    UnimputedNulls { step: String, column: String },

    /// A category seen at transform time was not present during fit.
    #[error("step '{step}' encountered unknown category '{value}' in column '{column}'")]
    UnknownCategory {
        step: String,
        column: String,
        value: String,
    },

    /// The columns offered at transform time do not match those seen at fit time.
    #[error("step '{step}' expected column '{expected}' but it is missing from the input")]
    ColumnMismatch { step: String, expected: String },

    /// Branch outputs disagree on row count and cannot be concatenated.
    #[error("branch outputs have mismatched heights ({left} vs {right})")]
    HeightMismatch { left: usize, right: usize },

    /// A fitted estimator received a feature table of the wrong width.
    #[error("estimator was fit on {expected} feature column(s) but received {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    /// A transform-only operation was requested on an estimator-terminated pipeline.
    #[error("pipeline terminates in estimator '{name}'; transform-only output is not available")]
    EstimatorTerminated { name: String },

    /// A prediction operation was requested on a transform-only pipeline.
    #[error("pipeline has no estimator stage; predict/score are not available")]
    NoEstimator,

    /// An estimator pipeline was fit without a target column.
    #[error("estimator '{name}' requires a target column to fit")]
    MissingTarget { name: String },

    /// The target column contains values outside the estimator's contract.
    #[error("target column '{column}' is not usable: {reason}")]
    InvalidTarget { column: String, reason: String },

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}

/// Errors raised while validating or running a parameter search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A parameter path does not resolve to a step in the pipeline.
    #[error("parameter path '{path}' does not resolve to any step in the pipeline")]
    UnresolvedPath { path: String },

    /// A parameter value is not accepted by the step the path points at.
    #[error("parameter path '{path}' does not accept {offered} (step takes {expected})")]
    IncompatibleParam {
        path: String,
        offered: String,
        expected: String,
    },

    /// The grid has no dimensions or a dimension with no candidate values.
    #[error("parameter grid is empty or has a dimension with no candidate values")]
    EmptyGrid,

    /// The fold count cannot be satisfied by the available rows.
    #[error("cannot split {rows} rows into {folds} folds (need folds >= 2 and rows >= folds)")]
    InvalidFolds { folds: usize, rows: usize },

    /// Grid search requires an estimator-terminated pipeline.
    #[error("grid search requires a pipeline with an estimator stage")]
    NoEstimator,

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}
