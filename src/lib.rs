//! Gridfit: Composable Feature Pipelines with Grid Search
//!
//! A library for building column-routed feature transformation pipelines
//! and tuning them with cross-validated hyperparameter search.

pub mod cli;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod utils;
