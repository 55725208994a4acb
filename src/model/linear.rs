//! Linear regression fit by batch gradient descent

use faer::Mat;

use crate::pipeline::error::TransformError;

/// Linear regression hyperparameters.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty applied to the weights (never the intercept).
    pub l2: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            epochs: 500,
            l2: 0.0,
        }
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    /// Fit weights on a design matrix and continuous targets.
    pub fn fit(
        &self,
        x: &Mat<f64>,
        y: &[f64],
        feature_names: Vec<String>,
    ) -> Result<FittedLinearRegression, TransformError> {
        let n_rows = x.nrows();
        let n_cols = x.ncols();
        if n_rows == 0 || n_rows != y.len() {
            return Err(TransformError::InvalidTarget {
                column: "target".to_string(),
                reason: format!("{} rows of features vs {} targets", n_rows, y.len()),
            });
        }

        let mut weights = vec![0.0; n_cols];
        let mut intercept = 0.0;
        let n = n_rows as f64;

        for _ in 0..self.epochs {
            let mut grad_w = vec![0.0; n_cols];
            let mut grad_b = 0.0;

            for i in 0..n_rows {
                let mut prediction = intercept;
                for j in 0..n_cols {
                    prediction += weights[j] * x[(i, j)];
                }
                let residual = prediction - y[i];
                for j in 0..n_cols {
                    grad_w[j] += residual * x[(i, j)];
                }
                grad_b += residual;
            }

            for j in 0..n_cols {
                weights[j] -= self.learning_rate * (grad_w[j] / n + self.l2 * weights[j]);
            }
            intercept -= self.learning_rate * grad_b / n;
        }

        Ok(FittedLinearRegression {
            weights,
            intercept,
            feature_names,
        })
    }
}

/// Fitted linear model.
#[derive(Debug, Clone)]
pub struct FittedLinearRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub feature_names: Vec<String>,
}

impl FittedLinearRegression {
    fn check_width(&self, x: &Mat<f64>) -> Result<(), TransformError> {
        if x.ncols() != self.weights.len() {
            return Err(TransformError::FeatureCountMismatch {
                expected: self.weights.len(),
                got: x.ncols(),
            });
        }
        Ok(())
    }

    /// Fitted values for each row.
    pub fn predict(&self, x: &Mat<f64>) -> Result<Vec<f64>, TransformError> {
        self.check_width(x)?;
        Ok((0..x.nrows())
            .map(|i| {
                let mut prediction = self.intercept;
                for j in 0..self.weights.len() {
                    prediction += self.weights[j] * x[(i, j)];
                }
                prediction
            })
            .collect())
    }

    /// Coefficient of determination (R²) against targets.
    pub fn score(&self, x: &Mat<f64>, y: &[f64]) -> Result<f64, TransformError> {
        let predictions = self.predict(x)?;
        if y.is_empty() {
            return Ok(0.0);
        }
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let ss_tot: f64 = y.iter().map(|t| (t - mean).powi(2)).sum();
        let ss_res: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, t)| (t - p).powi(2))
            .sum();
        if ss_tot == 0.0 {
            return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
        }
        Ok(1.0 - ss_res / ss_tot)
    }
}
