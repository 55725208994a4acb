//! Branch combination
//!
//! A combiner pairs each column group with its own transform chain, fits
//! every branch in isolation on its group's slice, and concatenates branch
//! outputs by column in declaration order. Output column identity comes
//! from the fitted chains, never from the input column order, so callers
//! read it from [`FittedCombiner::output_columns`].

use polars::prelude::*;
use rayon::prelude::*;

use crate::pipeline::chain::{FittedChain, TransformChain};
use crate::pipeline::error::TransformError;
use crate::pipeline::router::{ColumnGroup, ColumnRouter};

/// Declarative mapping of column groups to transform chains.
#[derive(Debug, Clone, Default)]
pub struct Combiner {
    branches: Vec<(ColumnGroup, TransformChain)>,
    allow_overlap: bool,
}

impl Combiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a branch. Branch order is output order.
    pub fn branch(mut self, group: ColumnGroup, chain: TransformChain) -> Self {
        self.branches.push((group, chain));
        self
    }

    /// Permit a column to feed more than one branch.
    pub fn allow_overlap(mut self, allow: bool) -> Self {
        self.allow_overlap = allow;
        self
    }

    pub fn branches(&self) -> &[(ColumnGroup, TransformChain)] {
        &self.branches
    }

    pub(crate) fn branches_mut(&mut self) -> &mut Vec<(ColumnGroup, TransformChain)> {
        &mut self.branches
    }

    fn router(&self) -> ColumnRouter {
        ColumnRouter::new(self.branches.iter().map(|(g, _)| g.clone()).collect())
            .allow_overlap(self.allow_overlap)
    }

    /// Fit every branch independently on its slice and return the fitted
    /// combiner together with the combined training output.
    ///
    /// Branches share no state, so they fit in parallel; output order is
    /// still declaration order.
    pub fn fit(&self, df: &DataFrame) -> Result<(FittedCombiner, DataFrame), TransformError> {
        let slices = self.router().route(df)?;

        let fitted_branches: Vec<(ColumnGroup, FittedChain, DataFrame)> = self
            .branches
            .par_iter()
            .zip(slices.par_iter())
            .map(|((group, chain), (_, slice))| {
                let (fitted, out) = chain.fit(slice)?;
                Ok((group.clone(), fitted, out))
            })
            .collect::<Result<_, TransformError>>()?;

        let outputs: Vec<&DataFrame> = fitted_branches.iter().map(|(_, _, out)| out).collect();
        let combined = hstack_outputs(&outputs)?;

        let output_columns = combined
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();

        let fitted = FittedCombiner {
            branches: fitted_branches
                .into_iter()
                .map(|(group, chain, _)| (group, chain))
                .collect(),
            allow_overlap: self.allow_overlap,
            output_columns,
        };
        Ok((fitted, combined))
    }
}

/// A fitted combiner: per-branch fitted chains plus the combined output schema.
#[derive(Debug, Clone)]
pub struct FittedCombiner {
    branches: Vec<(ColumnGroup, FittedChain)>,
    allow_overlap: bool,
    output_columns: Vec<String>,
}

impl FittedCombiner {
    /// Combined output column names, in emission order.
    pub fn output_columns(&self) -> &[String] {
        &self.output_columns
    }

    /// The fitted branches, in declaration order.
    pub fn branches(&self) -> &[(ColumnGroup, FittedChain)] {
        &self.branches
    }

    /// Route new data through every fitted branch and concatenate.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        let router = ColumnRouter::new(self.branches.iter().map(|(g, _)| g.clone()).collect())
            .allow_overlap(self.allow_overlap);
        let slices = router.route(df)?;

        let outputs: Vec<DataFrame> = self
            .branches
            .par_iter()
            .zip(slices.par_iter())
            .map(|((_, chain), (_, slice))| chain.transform(slice))
            .collect::<Result<_, TransformError>>()?;

        let refs: Vec<&DataFrame> = outputs.iter().collect();
        hstack_outputs(&refs)
    }
}

/// Concatenate branch outputs by column, skipping zero-column branches.
fn hstack_outputs(outputs: &[&DataFrame]) -> Result<DataFrame, TransformError> {
    let mut parts = outputs.iter().filter(|d| d.width() > 0);

    let Some(first) = parts.next() else {
        return Ok(DataFrame::empty());
    };

    let mut combined = (*first).clone();
    for part in parts {
        if part.height() != combined.height() {
            return Err(TransformError::HeightMismatch {
                left: combined.height(),
                right: part.height(),
            });
        }
        combined = combined.hstack(part.get_columns())?;
    }
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::impute::{ImputeStrategy, Imputer};
    use crate::pipeline::scale::{ScaleMethod, Scaler};
    use crate::pipeline::encode::OneHotEncoder;

    fn sample_df() -> DataFrame {
        df! {
            "age" => [Some(22.0f64), None, Some(26.0), Some(35.0)],
            "fare" => [7.25f64, 71.28, 7.92, 53.1],
            "sex" => ["male", "female", "female", "male"],
        }
        .unwrap()
    }

    fn standard_combiner() -> Combiner {
        Combiner::new()
            .branch(
                ColumnGroup::new("numeric", vec!["age".into(), "fare".into()]),
                TransformChain::new()
                    .step("impute", Imputer::new(ImputeStrategy::Mean))
                    .step("scale", Scaler::new(ScaleMethod::Standard)),
            )
            .branch(
                ColumnGroup::new("categorical", vec!["sex".into()]),
                TransformChain::new().step("encode", OneHotEncoder::new()),
            )
    }

    #[test]
    fn test_output_column_count_is_sum_of_branches() {
        let df = sample_df();
        let (fitted, out) = standard_combiner().fit(&df).unwrap();

        // numeric branch: 2 columns, categorical branch: 2 one-hot columns
        assert_eq!(out.width(), 4);
        assert_eq!(
            fitted.output_columns(),
            &["age", "fare", "sex_female", "sex_male"]
        );
        assert_eq!(out.height(), df.height());
    }

    #[test]
    fn test_branch_order_controls_output_order_not_values() {
        let df = sample_df();
        let (_, forward) = standard_combiner().fit(&df).unwrap();

        let reversed = Combiner::new()
            .branch(
                ColumnGroup::new("categorical", vec!["sex".into()]),
                TransformChain::new().step("encode", OneHotEncoder::new()),
            )
            .branch(
                ColumnGroup::new("numeric", vec!["age".into(), "fare".into()]),
                TransformChain::new()
                    .step("impute", Imputer::new(ImputeStrategy::Mean))
                    .step("scale", Scaler::new(ScaleMethod::Standard)),
            );
        let (_, backward) = reversed.fit(&df).unwrap();

        assert_eq!(forward.width(), backward.width());
        assert_eq!(
            backward.get_column_names(),
            &["sex_female", "sex_male", "age", "fare"]
        );
        assert_eq!(
            forward.column("age").unwrap(),
            backward.column("age").unwrap()
        );
    }

    #[test]
    fn test_empty_group_contributes_zero_columns() {
        let df = sample_df();
        let combiner = Combiner::new()
            .branch(ColumnGroup::empty("nothing"), TransformChain::new())
            .branch(
                ColumnGroup::new("numeric", vec!["fare".into()]),
                TransformChain::new().step("scale", Scaler::new(ScaleMethod::MinMax)),
            );

        let (_, out) = combiner.fit(&df).unwrap();
        assert_eq!(out.width(), 1);
        assert_eq!(out.height(), df.height());
    }

    #[test]
    fn test_transform_reuses_fitted_state() {
        let train = sample_df();
        let test = df! {
            "age" => [None::<f64>],
            "fare" => [10.0f64],
            "sex" => ["female"],
        }
        .unwrap();

        let (fitted, _) = standard_combiner().fit(&train).unwrap();
        let out = fitted.transform(&test).unwrap();

        assert_eq!(out.width(), 4);
        assert_eq!(out.height(), 1);
        // The null age is filled with the train mean, then standardized
        // with train statistics, landing near the center.
        let age = out.column("age").unwrap().f64().unwrap().get(0).unwrap();
        assert!(age.abs() < 1e-9);
    }
}
