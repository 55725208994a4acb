//! Hyperparameter search over pipelines
//!
//! The search space is a [`ParamGrid`] of typed paths and values; the
//! evaluator is [`GridSearch`], which cross-validates every combination
//! and ranks candidates by mean validation score.

pub mod cv;
pub mod grid_search;
pub mod params;

pub use cv::{FoldIndices, KFold};
pub use grid_search::{
    apply_candidate, refit_best, CandidateOutcome, CandidateResult, GridSearch, SearchSummary,
};
pub use params::{Candidate, ParamGrid, ParamPath, ParamValue};
