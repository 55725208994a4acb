//! One-hot encoding for categorical columns
//!
//! Learns the distinct categories of each column during fit and emits one
//! 0/1 indicator column per learned category, in learned (sorted) order.
//! Output column names are `{column}_{category}`.

use std::fmt;

use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::error::TransformError;

/// How to treat a category at transform time that was not seen during fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Fail, naming the step, column, and offending value.
    #[default]
    Error,
    /// Emit an all-zero indicator row for the unknown value.
    Ignore,
}

impl fmt::Display for HandleUnknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleUnknown::Error => write!(f, "error"),
            HandleUnknown::Ignore => write!(f, "ignore"),
        }
    }
}

/// Unfitted one-hot encoder configuration.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    pub handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handle_unknown(mut self, handle_unknown: HandleUnknown) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    /// Learn the category vocabulary of every column in the slice.
    ///
    /// Nulls are a data error here: imputation happens earlier in the
    /// chain, and letting nulls slip through would silently mint a
    /// phantom category.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedOneHotEncoder, TransformError> {
        let mut vocab = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let name = col.name().to_string();
            if col.null_count() > 0 {
                return Err(TransformError::UnimputedNulls {
                    step: "one_hot".to_string(),
                    column: name,
                });
            }
            let mut categories = categorical_values(col)?;
            categories.sort();
            categories.dedup();
            vocab.push((name, categories));
        }

        Ok(FittedOneHotEncoder {
            handle_unknown: self.handle_unknown,
            vocab,
        })
    }
}

/// Fitted encoder holding the learned categories per column.
#[derive(Debug, Clone)]
pub struct FittedOneHotEncoder {
    handle_unknown: HandleUnknown,
    vocab: Vec<(String, Vec<String>)>,
}

impl FittedOneHotEncoder {
    /// The learned categories, per input column in input order.
    pub fn categories(&self) -> &[(String, Vec<String>)] {
        &self.vocab
    }

    /// Output column names, in emission order.
    pub fn output_columns(&self) -> Vec<String> {
        self.vocab
            .iter()
            .flat_map(|(col, cats)| cats.iter().map(move |c| format!("{}_{}", col, c)))
            .collect()
    }

    /// Encode new data against the learned vocabulary.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        let mut out: Vec<Column> = Vec::new();

        for (name, categories) in &self.vocab {
            let col = df
                .column(name)
                .map_err(|_| TransformError::ColumnMismatch {
                    step: "one_hot".to_string(),
                    expected: name.clone(),
                })?;
            let values = categorical_values(col)?;

            if self.handle_unknown == HandleUnknown::Error {
                if let Some(unknown) = values
                    .iter()
                    .find(|v| !categories.contains(v))
                {
                    return Err(TransformError::UnknownCategory {
                        step: "one_hot".to_string(),
                        column: name.clone(),
                        value: unknown.clone(),
                    });
                }
            }

            for category in categories {
                let indicator: Vec<f64> = values
                    .iter()
                    .map(|v| if v == category { 1.0 } else { 0.0 })
                    .collect();
                out.push(Column::new(
                    format!("{}_{}", name, category).into(),
                    indicator,
                ));
            }
        }

        Ok(DataFrame::new(out)?)
    }
}

/// Normalize a column's values to category strings.
///
/// Strings pass through; numeric and boolean columns are stringified so a
/// low-cardinality integer code column can be encoded directly.
fn categorical_values(col: &Column) -> Result<Vec<String>, TransformError> {
    let name = col.name().to_string();
    let values: Vec<String> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect::<Option<Vec<String>>>()
            .ok_or(TransformError::UnimputedNulls {
                step: "one_hot".to_string(),
                column: name.clone(),
            })?,
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect::<Option<Vec<String>>>()
            .ok_or(TransformError::UnimputedNulls {
                step: "one_hot".to_string(),
                column: name.clone(),
            })?,
        dt if dt.is_primitive_numeric() => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect::<Option<Vec<String>>>()
                .ok_or(TransformError::UnimputedNulls {
                    step: "one_hot".to_string(),
                    column: name.clone(),
                })?
        }
        dt => {
            return Err(TransformError::IncompatibleDtype {
                step: "one_hot".to_string(),
                column: name,
                dtype: dt.to_string(),
            })
        }
    };
    Ok(values)
}
