//! Tagged step variants
//!
//! Every transform step is a member of one enum pair: the unfitted
//! configuration ([`TransformStep`]) and its fitted counterpart
//! ([`FittedStep`]). The pair keeps dispatch explicit and lets a chain
//! hold heterogeneous steps without trait objects.

use polars::prelude::DataFrame;

use crate::pipeline::encode::{FittedOneHotEncoder, OneHotEncoder};
use crate::pipeline::error::TransformError;
use crate::pipeline::impute::{FittedImputer, Imputer};
use crate::pipeline::scale::{FittedScaler, Scaler};

/// An unfitted transform step with its configuration.
#[derive(Debug, Clone)]
pub enum TransformStep {
    Imputer(Imputer),
    OneHot(OneHotEncoder),
    Scaler(Scaler),
}

impl TransformStep {
    /// The step family name used in error messages and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformStep::Imputer(_) => "impute",
            TransformStep::OneHot(_) => "one_hot",
            TransformStep::Scaler(_) => "scale",
        }
    }

    /// Fit this step on a data slice, producing its fitted counterpart.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedStep, TransformError> {
        match self {
            TransformStep::Imputer(step) => step.fit(df).map(FittedStep::Imputer),
            TransformStep::OneHot(step) => step.fit(df).map(FittedStep::OneHot),
            TransformStep::Scaler(step) => step.fit(df).map(FittedStep::Scaler),
        }
    }
}

impl From<Imputer> for TransformStep {
    fn from(step: Imputer) -> Self {
        TransformStep::Imputer(step)
    }
}

impl From<OneHotEncoder> for TransformStep {
    fn from(step: OneHotEncoder) -> Self {
        TransformStep::OneHot(step)
    }
}

impl From<Scaler> for TransformStep {
    fn from(step: Scaler) -> Self {
        TransformStep::Scaler(step)
    }
}

/// A fitted transform step holding train-time-learned state.
#[derive(Debug, Clone)]
pub enum FittedStep {
    Imputer(FittedImputer),
    OneHot(FittedOneHotEncoder),
    Scaler(FittedScaler),
}

impl FittedStep {
    pub fn kind(&self) -> &'static str {
        match self {
            FittedStep::Imputer(_) => "impute",
            FittedStep::OneHot(_) => "one_hot",
            FittedStep::Scaler(_) => "scale",
        }
    }

    /// Apply the learned state to new data without refitting.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        match self {
            FittedStep::Imputer(step) => step.transform(df),
            FittedStep::OneHot(step) => step.transform(df),
            FittedStep::Scaler(step) => step.transform(df),
        }
    }
}
