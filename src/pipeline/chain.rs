//! Sequential transform chains
//!
//! Fitting a chain is inherently ordered: step 1 fits on the input, its
//! output becomes step 2's fit input, and so on. No step ever sees the
//! original input except the first. Applying a fitted chain pushes new data
//! through each step's learned state in the same order, without refitting.

use polars::prelude::DataFrame;

use crate::pipeline::error::TransformError;
use crate::pipeline::step::{FittedStep, TransformStep};

/// An ordered list of named, unfitted transform steps.
#[derive(Debug, Clone, Default)]
pub struct TransformChain {
    steps: Vec<(String, TransformStep)>,
}

impl TransformChain {
    /// An empty chain. Fitting it yields the identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named step.
    pub fn step(mut self, name: impl Into<String>, step: impl Into<TransformStep>) -> Self {
        self.steps.push((name.into(), step.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The steps, in application order.
    pub fn steps(&self) -> &[(String, TransformStep)] {
        &self.steps
    }

    /// Mutable access for parameter overrides during a search.
    pub(crate) fn steps_mut(&mut self) -> &mut Vec<(String, TransformStep)> {
        &mut self.steps
    }

    /// Fit every step in order, feeding each step the previous step's
    /// output, and return the fitted chain together with the training
    /// slice's transformed output.
    pub fn fit(&self, df: &DataFrame) -> Result<(FittedChain, DataFrame), TransformError> {
        let mut current = df.clone();
        let mut fitted = Vec::with_capacity(self.steps.len());

        for (name, step) in &self.steps {
            let fitted_step = step.fit(&current)?;
            current = fitted_step.transform(&current)?;
            fitted.push((name.clone(), fitted_step));
        }

        Ok((FittedChain { steps: fitted }, current))
    }
}

/// A fitted chain: the same steps, now holding learned state.
#[derive(Debug, Clone)]
pub struct FittedChain {
    steps: Vec<(String, FittedStep)>,
}

impl FittedChain {
    /// The fitted steps, in application order.
    pub fn steps(&self) -> &[(String, FittedStep)] {
        &self.steps
    }

    /// Push new data through each fitted step, in order.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        let mut current = df.clone();
        for (_, step) in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::impute::{ImputeStrategy, Imputer};
    use crate::pipeline::scale::{ScaleMethod, Scaler};
    use polars::prelude::*;

    #[test]
    fn test_each_step_sees_previous_output() {
        let df = df! { "x" => [Some(0.0f64), None, Some(10.0)] }.unwrap();

        let chain = TransformChain::new()
            .step("impute", Imputer::new(ImputeStrategy::Mean))
            .step("scale", Scaler::new(ScaleMethod::MinMax));

        let (_, out) = chain.fit(&df).unwrap();

        // The scaler was fit on imputed data (0, 5, 10), so min/max come
        // from the filled values and the null row lands mid-range.
        let values: Vec<f64> = out
            .column("x")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(values, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_fit_then_transform_is_deterministic() {
        let df = df! { "x" => [Some(1.0f64), None, Some(3.0), Some(4.0)] }.unwrap();

        let chain = TransformChain::new()
            .step("impute", Imputer::new(ImputeStrategy::Median))
            .step("scale", Scaler::new(ScaleMethod::Standard));

        let (fitted, first) = chain.fit(&df).unwrap();
        let second = fitted.transform(&df).unwrap();

        assert_eq!(first, second);
        assert_eq!(fitted.transform(&df).unwrap(), second);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let df = df! { "x" => [1.0f64, 2.0] }.unwrap();
        let (fitted, out) = TransformChain::new().fit(&df).unwrap();

        assert_eq!(out, df);
        assert_eq!(fitted.transform(&df).unwrap(), df);
    }
}
