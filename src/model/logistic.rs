//! Logistic regression fit by batch gradient descent

use faer::Mat;

use crate::pipeline::error::TransformError;

/// Logistic regression hyperparameters.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty applied to the weights (never the intercept).
    pub l2: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 500,
            l2: 0.0,
        }
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    /// Fit weights on a design matrix and 0/1 targets.
    pub fn fit(
        &self,
        x: &Mat<f64>,
        y: &[f64],
        feature_names: Vec<String>,
    ) -> Result<FittedLogisticRegression, TransformError> {
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
                let mut z = intercept;
                for j in 0..n_cols {
                    z += weights[j] * x[(i, j)];
                }
                let residual = sigmoid(z) - y[i];
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

        Ok(FittedLogisticRegression {
            weights,
            intercept,
            feature_names,
        })
    }
}

/// Fitted logistic model.
#[derive(Debug, Clone)]
pub struct FittedLogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub feature_names: Vec<String>,
}

impl FittedLogisticRegression {
    fn check_width(&self, x: &Mat<f64>) -> Result<(), TransformError> {
        if x.ncols() != self.weights.len() {
            return Err(TransformError::FeatureCountMismatch {
                expected: self.weights.len(),
                got: x.ncols(),
            });
        }
        Ok(())
    }

    /// Class probabilities for each row.
    pub fn predict_proba(&self, x: &Mat<f64>) -> Result<Vec<f64>, TransformError> {
        self.check_width(x)?;
        Ok((0..x.nrows())
            .map(|i| {
                let mut z = self.intercept;
                for j in 0..self.weights.len() {
                    z += self.weights[j] * x[(i, j)];
                }
                sigmoid(z)
            })
            .collect())
    }

    /// Class labels at the 0.5 threshold.
    pub fn predict(&self, x: &Mat<f64>) -> Result<Vec<f64>, TransformError> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| if p >= 0.5 { 1.0 } else { 0.0 })
            .collect())
    }

    /// Accuracy against 0/1 targets.
    pub fn score(&self, x: &Mat<f64>, y: &[f64]) -> Result<f64, TransformError> {
        let predictions = self.predict(x)?;
        if y.is_empty() {
            return Ok(0.0);
        }
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        Ok(correct as f64 / y.len() as f64)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Mat<f64>, Vec<f64>) {
        // One feature, classes split around 0.
        let values = [-2.0, -1.5, -1.0, -0.5, 0.5, 1.0, 1.5, 2.0];
        let mut x = Mat::<f64>::zeros(values.len(), 1);
        for (i, v) in values.iter().enumerate() {
            x[(i, 0)] = *v;
        }
        let y = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_separable_data_is_learned() {
        let (x, y) = separable_data();
        let fitted = LogisticRegression::new()
            .fit(&x, &y, vec!["x".to_string()])
            .unwrap();

        assert_eq!(fitted.score(&x, &y).unwrap(), 1.0);
        assert!(fitted.weights[0] > 0.0);
    }

    #[test]
    fn test_width_mismatch_is_surfaced() {
        let (x, y) = separable_data();
        let fitted = LogisticRegression::new()
            .fit(&x, &y, vec!["x".to_string()])
            .unwrap();

        let wide = Mat::<f64>::zeros(2, 3);
        assert!(matches!(
            fitted.predict(&wide).unwrap_err(),
            TransformError::FeatureCountMismatch {
                expected: 1,
                got: 3
            }
        ));
    }

    #[test]
    fn test_l2_shrinks_weights() {
        let (x, y) = separable_data();
        let plain = LogisticRegression::new()
            .fit(&x, &y, vec!["x".to_string()])
            .unwrap();
        let penalized = LogisticRegression::new()
            .with_l2(1.0)
            .fit(&x, &y, vec!["x".to_string()])
            .unwrap();

        assert!(penalized.weights[0].abs() < plain.weights[0].abs());
    }

    #[test]
    fn test_row_mismatch_is_rejected() {
        let x = Mat::<f64>::zeros(3, 1);
        let err = LogisticRegression::new()
            .fit(&x, &[0.0, 1.0], vec!["x".to_string()])
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidTarget { .. }));
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!(sigmoid(100.0) > 0.999);
        assert!(sigmoid(-100.0) < 0.001);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }
}
