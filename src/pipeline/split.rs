//! Train/test splitting
//!
//! Splitting happens once, before any step is fit, so train-time
//! statistics can never leak from held-out rows.

use anyhow::Result;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split a DataFrame into shuffled train and test partitions.
///
/// # Arguments
/// * `df` - The full dataset
/// * `test_fraction` - Fraction of rows held out for testing (0, 1)
/// * `seed` - Seed for the shuffle; the same seed reproduces the split
pub fn train_test_split(
    df: &DataFrame,
    test_fraction: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        anyhow::bail!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        );
    }
    let n_rows = df.height();
    let n_test = ((n_rows as f64) * test_fraction).round() as usize;
    if n_test == 0 || n_test == n_rows {
        anyhow::bail!(
            "test_fraction {} leaves an empty partition for {} rows",
            test_fraction,
            n_rows
        );
    }

    let mut indices: Vec<IdxSize> = (0..n_rows as IdxSize).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

    Ok((df.take(&train_idx)?, df.take(&test_idx)?))
}
