//! Column routing - partitions a table's columns into named groups
//!
//! Each group is dispatched to its own transform chain, so routing is the
//! first thing validated: every referenced column must exist, and a column
//! may only appear in multiple groups when overlap is explicitly enabled.

use std::collections::HashSet;

use polars::prelude::*;

use crate::pipeline::error::TransformError;

/// A named, ordered subset of a table's column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroup {
    pub name: String,
    pub columns: Vec<String>,
}

impl ColumnGroup {
    /// Create a new column group.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// A group with no columns. Routes to a zero-column slice without error.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// Routes a DataFrame into per-group slices, preserving row order.
#[derive(Debug, Clone)]
pub struct ColumnRouter {
    groups: Vec<ColumnGroup>,
    allow_overlap: bool,
}

impl ColumnRouter {
    /// Create a router over the given groups. Overlap is rejected by default.
    pub fn new(groups: Vec<ColumnGroup>) -> Self {
        Self {
            groups,
            allow_overlap: false,
        }
    }

    /// Permit the same column to appear in more than one group.
    ///
    /// Overlap duplicates the column into every group that names it, which
    /// is occasionally intentional (e.g. scaling and binning the same
    /// feature) but must be opted into.
    pub fn allow_overlap(mut self, allow: bool) -> Self {
        self.allow_overlap = allow;
        self
    }

    /// The group definitions, in declaration order.
    pub fn groups(&self) -> &[ColumnGroup] {
        &self.groups
    }

    /// Check group definitions against a DataFrame without slicing it.
    ///
    /// Fails on the first unknown column, or on overlap when overlap has
    /// not been enabled. Configuration errors surface here, before any
    /// fitting work is performed.
    pub fn validate(&self, df: &DataFrame) -> Result<(), TransformError> {
        let available: HashSet<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        for group in &self.groups {
            for column in &group.columns {
                if !available.contains(column.as_str()) {
                    return Err(TransformError::MissingColumn {
                        group: group.name.clone(),
                        column: column.clone(),
                    });
                }
                if !seen.insert(column.as_str()) && !self.allow_overlap {
                    return Err(TransformError::OverlappingGroups {
                        column: column.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Produce, for each group, the DataFrame restricted to that group's
    /// columns. Row order and row count are preserved in every slice; an
    /// empty group yields a zero-column frame.
    pub fn route(&self, df: &DataFrame) -> Result<Vec<(String, DataFrame)>, TransformError> {
        self.validate(df)?;

        let mut slices = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let slice = if group.columns.is_empty() {
                DataFrame::empty()
            } else {
                df.select(group.columns.iter().map(String::as_str))?
            };
            slices.push((group.name.clone(), slice));
        }
        Ok(slices)
    }
}

/// Partition a DataFrame's columns into a numeric and a categorical group
/// by dtype, excluding the target column.
///
/// Numeric primitive columns land in "numeric"; string and boolean columns
/// land in "categorical". Other dtypes are skipped.
pub fn infer_groups(df: &DataFrame, target: &str) -> (ColumnGroup, ColumnGroup) {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();

    for col in df.get_columns() {
        let name = col.name().as_str();
        if name == target {
            continue;
        }
        if col.dtype().is_primitive_numeric() {
            numeric.push(name.to_string());
        } else if matches!(col.dtype(), DataType::String | DataType::Boolean) {
            categorical.push(name.to_string());
        }
    }

    (
        ColumnGroup::new("numeric", numeric),
        ColumnGroup::new("categorical", categorical),
    )
}
