//! Missing-value imputation
//!
//! Learns one fill value per column on the training data and reuses it,
//! unchanged, on any later data. Numeric columns are emitted as Float64
//! (mean fills are fractional); string and boolean columns are emitted
//! as strings, matching how the encoder sees them.

use std::collections::HashMap;
use std::fmt;

use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::error::TransformError;

/// A constant replacement value for [`ImputeStrategy::Constant`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillValue::Number(v) => write!(f, "{}", v),
            FillValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Strategy for replacing missing values.
///
/// A fill value can only be supplied through `Constant`; the other
/// strategies learn their replacement from the training data, so a
/// dangling `fill_value` setting cannot exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Column mean. Numeric columns only.
    Mean,
    /// Column median. Numeric columns only.
    Median,
    /// Most common value; ties resolve to the smallest value for
    /// deterministic refits. Numeric, string, and boolean columns.
    MostFrequent,
    /// A caller-supplied constant. The value's family must match the
    /// column's (numeric constant for numeric columns, text for string
    /// and boolean).
    Constant(FillValue),
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputeStrategy::Mean => write!(f, "mean"),
            ImputeStrategy::Median => write!(f, "median"),
            ImputeStrategy::MostFrequent => write!(f, "most_frequent"),
            ImputeStrategy::Constant(v) => write!(f, "constant({})", v),
        }
    }
}

impl std::str::FromStr for ImputeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(ImputeStrategy::Mean),
            "median" => Ok(ImputeStrategy::Median),
            "most_frequent" | "mode" => Ok(ImputeStrategy::MostFrequent),
            other => Err(format!(
                "unknown imputation strategy '{}'. Options: mean, median, most_frequent",
                other
            )),
        }
    }
}

/// Unfitted imputer configuration.
#[derive(Debug, Clone)]
pub struct Imputer {
    pub strategy: ImputeStrategy,
    /// When set, a `{col}_missing` 0/1 column is appended for every input
    /// column that contained nulls during fit.
    pub add_indicator: bool,
}

impl Imputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            add_indicator: false,
        }
    }

    pub fn with_indicator(mut self, add_indicator: bool) -> Self {
        self.add_indicator = add_indicator;
        self
    }

    /// Learn fill values from the training slice.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedImputer, TransformError> {
        let mut fills = Vec::with_capacity(df.width());
        let mut indicator_columns = Vec::new();

        for col in df.get_columns() {
            let name = col.name().to_string();
            if self.add_indicator && col.null_count() > 0 {
                indicator_columns.push(name.clone());
            }
            let fill = learn_fill(col, &self.strategy)?;
            fills.push((name, fill));
        }

        Ok(FittedImputer {
            strategy: self.strategy.clone(),
            fills,
            indicator_columns,
        })
    }
}

/// Fitted imputer holding one learned fill value per column.
#[derive(Debug, Clone)]
pub struct FittedImputer {
    strategy: ImputeStrategy,
    fills: Vec<(String, FillValue)>,
    indicator_columns: Vec<String>,
}

impl FittedImputer {
    /// The learned fill values, in input column order.
    pub fn fill_values(&self) -> &[(String, FillValue)] {
        &self.fills
    }

    /// The strategy this imputer was configured with.
    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Apply the learned fills to new data.
    ///
    /// Indicator columns reflect the nulls of the incoming slice but are
    /// only emitted for columns recorded as missing-prone during fit.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        let mut out: Vec<Column> = Vec::with_capacity(self.fills.len());
        let mut indicators: Vec<Column> = Vec::new();

        for (name, fill) in &self.fills {
            let col = df
                .column(name)
                .map_err(|_| TransformError::ColumnMismatch {
                    step: "impute".to_string(),
                    expected: name.clone(),
                })?;

            let filled = match fill {
                FillValue::Number(v) => {
                    let cast = col.cast(&DataType::Float64)?;
                    let values: Vec<f64> = cast
                        .f64()?
                        .into_iter()
                        .map(|x| x.unwrap_or(*v))
                        .collect();
                    Column::new(name.as_str().into(), values)
                }
                FillValue::Text(s) => {
                    // Boolean columns are stringified so the fill and the
                    // downstream encoder see one value family.
                    let values: Vec<String> = match col.dtype() {
                        DataType::Boolean => col
                            .bool()?
                            .into_iter()
                            .map(|x| x.map_or_else(|| s.clone(), |b| b.to_string()))
                            .collect(),
                        _ => col
                            .str()?
                            .into_iter()
                            .map(|x| x.unwrap_or(s.as_str()).to_string())
                            .collect(),
                    };
                    Column::new(name.as_str().into(), values)
                }
            };
            out.push(filled);

            if self.indicator_columns.contains(name) {
                let mask: Vec<i32> = col
                    .as_materialized_series()
                    .iter()
                    .map(|v| if v.is_null() { 1 } else { 0 })
                    .collect();
                indicators.push(Column::new(format!("{}_missing", name).into(), mask));
            }
        }

        out.extend(indicators);
        Ok(DataFrame::new(out)?)
    }
}

/// Learn the fill value for a single column, ignoring nulls.
fn learn_fill(col: &Column, strategy: &ImputeStrategy) -> Result<FillValue, TransformError> {
    let name = col.name().to_string();
    let is_numeric = col.dtype().is_primitive_numeric();
    let is_text = matches!(col.dtype(), DataType::String | DataType::Boolean);

    if !is_numeric && !is_text {
        return Err(TransformError::IncompatibleDtype {
            step: "impute".to_string(),
            column: name,
            dtype: col.dtype().to_string(),
        });
    }

    match strategy {
        ImputeStrategy::Constant(value) => {
            let compatible = matches!(
                (value, is_numeric),
                (FillValue::Number(_), true) | (FillValue::Text(_), false)
            );
            if !compatible {
                return Err(TransformError::IncompatibleDtype {
                    step: "impute".to_string(),
                    column: name,
                    dtype: col.dtype().to_string(),
                });
            }
            Ok(value.clone())
        }
        ImputeStrategy::Mean | ImputeStrategy::Median => {
            if !is_numeric {
                return Err(TransformError::IncompatibleDtype {
                    step: "impute".to_string(),
                    column: name,
                    dtype: col.dtype().to_string(),
                });
            }
            let values = numeric_values(col)?;
            if values.is_empty() {
                return Err(TransformError::NoStatistic {
                    step: "impute".to_string(),
                    column: name,
                });
            }
            let fill = match strategy {
                ImputeStrategy::Mean => values.iter().sum::<f64>() / values.len() as f64,
                _ => median(values),
            };
            Ok(FillValue::Number(fill))
        }
        ImputeStrategy::MostFrequent => {
            if is_numeric {
                let values = numeric_values(col)?;
                if values.is_empty() {
                    return Err(TransformError::NoStatistic {
                        step: "impute".to_string(),
                        column: name,
                    });
                }
                let mut counts: HashMap<u64, usize> = HashMap::new();
                for v in &values {
                    *counts.entry(v.to_bits()).or_insert(0) += 1;
                }
                // Highest count wins; ties resolve to the smallest value.
                let mode = counts
                    .into_iter()
                    .map(|(bits, count)| (count, f64::from_bits(bits)))
                    .max_by(|a, b| {
                        a.0.cmp(&b.0)
                            .then(b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
                    })
                    .map(|(_, v)| v)
                    .unwrap_or(0.0);
                Ok(FillValue::Number(mode))
            } else {
                let mut counts: HashMap<String, usize> = HashMap::new();
                for v in text_values(col)? {
                    *counts.entry(v).or_insert(0) += 1;
                }
                if counts.is_empty() {
                    return Err(TransformError::NoStatistic {
                        step: "impute".to_string(),
                        column: name,
                    });
                }
                let mode = counts
                    .into_iter()
                    .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
                    .map(|(v, _)| v)
                    .unwrap_or_default();
                Ok(FillValue::Text(mode))
            }
        }
    }
}

/// Collect a column's non-null values as strings. Boolean columns are
/// stringified the same way the encoder stringifies them.
fn text_values(col: &Column) -> Result<Vec<String>, TransformError> {
    match col.dtype() {
        DataType::Boolean => Ok(col
            .bool()?
            .into_iter()
            .flatten()
            .map(|b| b.to_string())
            .collect()),
        _ => Ok(col
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect()),
    }
}

/// Collect a column's non-null values as f64.
fn numeric_values(col: &Column) -> Result<Vec<f64>, TransformError> {
    let cast = col.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().flatten().collect())
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}
