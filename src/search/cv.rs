//! K-fold cross-validation splits
//!
//! Folds are contiguous blocks of the (optionally shuffled) row index
//! sequence. With `rows % folds == r`, the first `r` folds hold one extra
//! row, so together the validation folds cover every row exactly once.

use polars::prelude::IdxSize;
use rand::prelude::*;

use crate::pipeline::error::SearchError;

/// One train/validation index pair.
#[derive(Debug, Clone)]
pub struct FoldIndices {
    pub train: Vec<IdxSize>,
    pub validation: Vec<IdxSize>,
}

/// K-fold splitter configuration.
#[derive(Debug, Clone, Copy)]
pub struct KFold {
    folds: usize,
    seed: Option<u64>,
}

impl KFold {
    pub fn new(folds: usize) -> Self {
        Self { folds, seed: None }
    }

    /// Shuffle the row order with a seeded generator before folding.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    /// Split `rows` row indices into `folds` train/validation pairs.
    pub fn split(&self, rows: usize) -> Result<Vec<FoldIndices>, SearchError> {
        if self.folds < 2 || rows < self.folds {
            return Err(SearchError::InvalidFolds {
                folds: self.folds,
                rows,
            });
        }

        let mut order: Vec<IdxSize> = (0..rows as IdxSize).collect();
        if let Some(seed) = self.seed {
            let mut rng = StdRng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }

        let base = rows / self.folds;
        let extra = rows % self.folds;

        let mut splits = Vec::with_capacity(self.folds);
        let mut start = 0usize;
        for fold in 0..self.folds {
            let size = base + usize::from(fold < extra);
            let end = start + size;

            let validation = order[start..end].to_vec();
            let mut train = Vec::with_capacity(rows - size);
            train.extend_from_slice(&order[..start]);
            train.extend_from_slice(&order[end..]);

            splits.push(FoldIndices { train, validation });
            start = end;
        }

        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_validation_folds_partition_the_rows() {
        let splits = KFold::new(4).split(10).unwrap();
        assert_eq!(splits.len(), 4);

        // 10 rows into 4 folds: the first two folds get the extra rows
        let sizes: Vec<usize> = splits.iter().map(|s| s.validation.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);

        let mut seen = HashSet::new();
        for split in &splits {
            assert_eq!(split.train.len() + split.validation.len(), 10);
            for idx in &split.validation {
                assert!(seen.insert(*idx), "row {} validated twice", idx);
                assert!(!split.train.contains(idx));
            }
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let first = KFold::new(3).with_seed(42).split(9).unwrap();
        let second = KFold::new(3).with_seed(42).split(9).unwrap();
        let other = KFold::new(3).with_seed(7).split(9).unwrap();

        assert_eq!(first[0].validation, second[0].validation);
        assert_ne!(first[0].validation, other[0].validation);
    }

    #[test]
    fn test_unshuffled_folds_are_contiguous() {
        let splits = KFold::new(2).split(6).unwrap();
        assert_eq!(splits[0].validation, vec![0, 1, 2]);
        assert_eq!(splits[1].validation, vec![3, 4, 5]);
    }

    #[test]
    fn test_degenerate_configurations_are_rejected() {
        assert!(matches!(
            KFold::new(1).split(10),
            Err(SearchError::InvalidFolds { folds: 1, rows: 10 })
        ));
        assert!(matches!(
            KFold::new(5).split(3),
            Err(SearchError::InvalidFolds { folds: 5, rows: 3 })
        ));
    }
}
