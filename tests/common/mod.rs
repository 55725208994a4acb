//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a small passenger-style DataFrame with known characteristics
///
/// This DataFrame includes:
/// - `survived`: Binary target column (0/1)
/// - `age`: Numeric with some missing values
/// - `fare`: Clean numeric
/// - `sex`: Categorical with two levels
/// - `embarked`: Categorical with a missing value
pub fn create_passenger_dataframe() -> DataFrame {
    df! {
        "survived" => [0i32, 1, 1, 1, 0, 0, 0, 1, 1, 1],
        "age" => [
            Some(22.0f64), Some(38.0), Some(26.0), Some(35.0), Some(35.0),
            None, Some(54.0), Some(2.0), Some(27.0), None,
        ],
        "fare" => [7.25f64, 71.28, 7.92, 53.1, 8.05, 8.46, 51.86, 21.07, 11.13, 30.07],
        "sex" => [
            "male", "female", "female", "female", "male",
            "male", "male", "male", "female", "female",
        ],
        "embarked" => [
            Some("S"), Some("C"), Some("S"), Some("S"), Some("S"),
            Some("Q"), Some("S"), Some("S"), None, Some("C"),
        ],
    }
    .unwrap()
}

/// Create a numeric-only DataFrame with a missing-value column
pub fn create_numeric_dataframe() -> DataFrame {
    df! {
        "a" => [Some(1.0f64), None, Some(3.0), Some(4.0), Some(5.0)],
        "b" => [10.0f64, 20.0, 30.0, 40.0, 50.0],
    }
    .unwrap()
}

/// Create a larger seeded DataFrame for search and stress tests
pub fn create_seeded_dataframe(rows: usize) -> (DataFrame, Column) {
    use rand::prelude::*;
    let mut rng = StdRng::seed_from_u64(7);

    let mut x1: Vec<Option<f64>> = Vec::with_capacity(rows);
    let mut x2: Vec<f64> = Vec::with_capacity(rows);
    let mut group: Vec<&str> = Vec::with_capacity(rows);
    let mut target: Vec<i32> = Vec::with_capacity(rows);

    for _ in 0..rows {
        let value: f64 = rng.gen_range(-2.0..2.0);
        // roughly 10% missing
        x1.push(if rng.gen::<f64>() < 0.1 {
            None
        } else {
            Some(value)
        });
        x2.push(rng.gen_range(0.0..100.0));
        group.push(if rng.gen::<bool>() { "left" } else { "right" });
        target.push(i32::from(value > 0.0));
    }

    let df = df! {
        "x1" => x1,
        "x2" => x2,
        "group" => group,
    }
    .unwrap();
    let target = Column::new("target".into(), target);
    (df, target)
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(
        rows, expected_rows,
        "Row count mismatch: expected {}, got {}",
        expected_rows, rows
    );
    assert_eq!(
        cols, expected_cols,
        "Column count mismatch: expected {}, got {}",
        expected_cols, cols
    );
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
