//! Numeric feature scaling
//!
//! Standard scaling (zero mean, unit variance) and min-max scaling onto
//! [0, 1]. Statistics are learned on the training slice over non-null
//! values; nulls pass through untouched so a later step can still see them.

use std::fmt;

use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::error::TransformError;

/// Scaling method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMethod {
    /// `(x - mean) / std`; zero-variance columns map to 0.
    #[default]
    Standard,
    /// `(x - min) / (max - min)` onto [0, 1]; constant columns map to 0.
    MinMax,
}

impl fmt::Display for ScaleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleMethod::Standard => write!(f, "standard"),
            ScaleMethod::MinMax => write!(f, "min_max"),
        }
    }
}

impl std::str::FromStr for ScaleMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ScaleMethod::Standard),
            "min_max" | "minmax" => Ok(ScaleMethod::MinMax),
            other => Err(format!(
                "unknown scaling method '{}'. Options: standard, min_max",
                other
            )),
        }
    }
}

/// Unfitted scaler configuration.
#[derive(Debug, Clone, Default)]
pub struct Scaler {
    pub method: ScaleMethod,
}

impl Scaler {
    pub fn new(method: ScaleMethod) -> Self {
        Self { method }
    }

    /// Learn per-column location/spread statistics.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedScaler, TransformError> {
        let mut stats = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let name = col.name().to_string();
            if !col.dtype().is_primitive_numeric() {
                return Err(TransformError::IncompatibleDtype {
                    step: "scale".to_string(),
                    column: name,
                    dtype: col.dtype().to_string(),
                });
            }

            let cast = col.cast(&DataType::Float64)?;
            let values: Vec<f64> = cast.f64()?.into_iter().flatten().collect();
            if values.is_empty() {
                return Err(TransformError::NoStatistic {
                    step: "scale".to_string(),
                    column: name,
                });
            }

            let stat = match self.method {
                ScaleMethod::Standard => {
                    let mean = values.iter().sum::<f64>() / values.len() as f64;
                    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                        / values.len() as f64;
                    ColumnStats {
                        offset: mean,
                        // Zero-variance columns scale by 1 so they map to 0.
                        scale: if var > 0.0 { var.sqrt() } else { 1.0 },
                    }
                }
                ScaleMethod::MinMax => {
                    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
                    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    ColumnStats {
                        offset: min,
                        scale: if max > min { max - min } else { 1.0 },
                    }
                }
            };
            stats.push((name, stat));
        }

        Ok(FittedScaler {
            method: self.method,
            stats,
        })
    }
}

/// Learned location and spread for one column.
#[derive(Debug, Clone, Copy)]
struct ColumnStats {
    offset: f64,
    scale: f64,
}

/// Fitted scaler ready to be applied to new data.
#[derive(Debug, Clone)]
pub struct FittedScaler {
    method: ScaleMethod,
    stats: Vec<(String, ColumnStats)>,
}

impl FittedScaler {
    pub fn method(&self) -> ScaleMethod {
        self.method
    }

    /// Apply the learned statistics; fitted state is never updated here.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        let mut out = Vec::with_capacity(self.stats.len());

        for (name, stat) in &self.stats {
            let col = df
                .column(name)
                .map_err(|_| TransformError::ColumnMismatch {
                    step: "scale".to_string(),
                    expected: name.clone(),
                })?;
            let cast = col.cast(&DataType::Float64)?;
            let scaled: Vec<Option<f64>> = cast
                .f64()?
                .into_iter()
                .map(|v| v.map(|x| (x - stat.offset) / stat.scale))
                .collect();
            out.push(Column::new(name.as_str().into(), scaled));
        }

        Ok(DataFrame::new(out)?)
    }
}
