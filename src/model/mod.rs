//! Estimators - the optional terminal stage of a pipeline
//!
//! Both models fit by gradient descent on a dense design matrix built from
//! the final feature table. The feature table must be fully numeric and
//! null-free by the time it reaches an estimator; anything else is a data
//! error naming the offending column.

pub mod linear;
pub mod logistic;

pub use linear::{FittedLinearRegression, LinearRegression};
pub use logistic::{FittedLogisticRegression, LogisticRegression};

use faer::Mat;
use polars::prelude::*;

use crate::pipeline::error::TransformError;

/// Tagged estimator configuration.
#[derive(Debug, Clone)]
pub enum Estimator {
    /// Binary classifier scored by accuracy.
    Logistic(LogisticRegression),
    /// Continuous regressor scored by R².
    Linear(LinearRegression),
}

impl Estimator {
    /// A logistic regression classifier with default hyperparameters.
    pub fn logistic() -> Self {
        Estimator::Logistic(LogisticRegression::default())
    }

    /// A linear regression model with default hyperparameters.
    pub fn linear() -> Self {
        Estimator::Linear(LinearRegression::default())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::Logistic(_) => "logistic_regression",
            Estimator::Linear(_) => "linear_regression",
        }
    }

    /// Fit on the final feature table and target column.
    pub fn fit(&self, features: &DataFrame, target: &Column) -> Result<FittedEstimator, TransformError> {
        let (x, columns) = design_matrix(features)?;
        match self {
            Estimator::Logistic(model) => {
                let y = binary_target(target)?;
                Ok(FittedEstimator::Logistic(model.fit(&x, &y, columns)?))
            }
            Estimator::Linear(model) => {
                let y = numeric_target(target)?;
                Ok(FittedEstimator::Linear(model.fit(&x, &y, columns)?))
            }
        }
    }

    /// The learning rate knob, shared by both members.
    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        match self {
            Estimator::Logistic(m) => m.learning_rate = learning_rate,
            Estimator::Linear(m) => m.learning_rate = learning_rate,
        }
    }

    /// The epoch-count knob, shared by both members.
    pub fn set_epochs(&mut self, epochs: usize) {
        match self {
            Estimator::Logistic(m) => m.epochs = epochs,
            Estimator::Linear(m) => m.epochs = epochs,
        }
    }

    /// The L2 penalty knob, shared by both members.
    pub fn set_l2(&mut self, l2: f64) {
        match self {
            Estimator::Logistic(m) => m.l2 = l2,
            Estimator::Linear(m) => m.l2 = l2,
        }
    }
}

/// A fitted estimator ready to predict and score new data.
#[derive(Debug, Clone)]
pub enum FittedEstimator {
    Logistic(FittedLogisticRegression),
    Linear(FittedLinearRegression),
}

impl FittedEstimator {
    pub fn kind(&self) -> &'static str {
        match self {
            FittedEstimator::Logistic(_) => "logistic_regression",
            FittedEstimator::Linear(_) => "linear_regression",
        }
    }

    /// Predictions for new feature rows (class labels for the classifier,
    /// fitted values for the regressor).
    pub fn predict(&self, features: &DataFrame) -> Result<Vec<f64>, TransformError> {
        let (x, _) = design_matrix(features)?;
        match self {
            FittedEstimator::Logistic(m) => m.predict(&x),
            FittedEstimator::Linear(m) => m.predict(&x),
        }
    }

    /// Score new data against its targets: accuracy for the classifier,
    /// R² for the regressor. Higher is better for both.
    pub fn score(&self, features: &DataFrame, target: &Column) -> Result<f64, TransformError> {
        let (x, _) = design_matrix(features)?;
        match self {
            FittedEstimator::Logistic(m) => {
                let y = binary_target(target)?;
                m.score(&x, &y)
            }
            FittedEstimator::Linear(m) => {
                let y = numeric_target(target)?;
                m.score(&x, &y)
            }
        }
    }
}

/// Build a dense design matrix from a fully numeric, null-free DataFrame.
pub(crate) fn design_matrix(df: &DataFrame) -> Result<(Mat<f64>, Vec<String>), TransformError> {
    let n_rows = df.height();
    let n_cols = df.width();
    let mut x = Mat::<f64>::zeros(n_rows, n_cols);
    let mut columns = Vec::with_capacity(n_cols);

    for (col_idx, col) in df.get_columns().iter().enumerate() {
        let name = col.name().to_string();
        if !col.dtype().is_primitive_numeric() {
            return Err(TransformError::IncompatibleDtype {
                step: "estimator".to_string(),
                column: name,
                dtype: col.dtype().to_string(),
            });
        }
        let cast = col.cast(&DataType::Float64)?;
        for (row_idx, value) in cast.f64()?.into_iter().enumerate() {
            let Some(v) = value else {
                return Err(TransformError::UnimputedNulls {
                    step: "estimator".to_string(),
                    column: name,
                });
            };
            x[(row_idx, col_idx)] = v;
        }
        columns.push(name);
    }

    Ok((x, columns))
}

/// Extract a numeric target as f64, rejecting nulls.
fn numeric_target(target: &Column) -> Result<Vec<f64>, TransformError> {
    let name = target.name().to_string();
    let cast = target
        .cast(&DataType::Float64)
        .map_err(|_| TransformError::InvalidTarget {
            column: name.clone(),
            reason: "not numeric".to_string(),
        })?;
    cast.f64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| TransformError::InvalidTarget {
                column: name.clone(),
                reason: "contains nulls".to_string(),
            })
        })
        .collect()
}

/// Extract a binary 0/1 target, rejecting anything else.
fn binary_target(target: &Column) -> Result<Vec<f64>, TransformError> {
    let values = numeric_target(target)?;
    if values.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(TransformError::InvalidTarget {
            column: target.name().to_string(),
            reason: "classification targets must be 0/1".to_string(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_matrix_shape_and_values() {
        let df = df! {
            "a" => [1.0f64, 2.0],
            "b" => [3i32, 4],
        }
        .unwrap();

        let (x, columns) = design_matrix(&df).unwrap();
        assert_eq!((x.nrows(), x.ncols()), (2, 2));
        assert_eq!(x[(1, 0)], 2.0);
        assert_eq!(x[(0, 1)], 3.0);
        assert_eq!(columns, vec!["a", "b"]);
    }

    #[test]
    fn test_design_matrix_rejects_nulls_and_strings() {
        let with_null = df! { "a" => [Some(1.0f64), None] }.unwrap();
        assert!(matches!(
            design_matrix(&with_null).unwrap_err(),
            TransformError::UnimputedNulls { .. }
        ));

        let with_text = df! { "a" => ["x", "y"] }.unwrap();
        assert!(matches!(
            design_matrix(&with_text).unwrap_err(),
            TransformError::IncompatibleDtype { .. }
        ));
    }

    #[test]
    fn test_binary_target_validation() {
        let ok = Column::new("y".into(), [0i32, 1, 1, 0]);
        assert!(binary_target(&ok).is_ok());

        let bad = Column::new("y".into(), [0i32, 2]);
        assert!(matches!(
            binary_target(&bad).unwrap_err(),
            TransformError::InvalidTarget { .. }
        ));
    }
}
