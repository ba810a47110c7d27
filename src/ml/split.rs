//! Seeded train/test split and k-fold partitioning.

use crate::error::{AppError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices of a train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffle `0..n` with a seeded RNG and hold out `ceil(test_size * n)` rows.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<DataSplit> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(AppError::Validation(format!(
            "test_size must be in [0, 1), got {}",
            test_size
        )));
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test >= n {
        return Err(AppError::Validation(format!(
            "Not enough rows ({}) to hold out a test split of {}",
            n, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(n_test);
    Ok(DataSplit {
        train_indices,
        test_indices: indices,
    })
}

/// Contiguous k-fold partition of `0..n` (no shuffling).
///
/// The first `n % k` folds get one extra row. `k` is capped at `n`.
pub fn k_fold(n: usize, k: usize) -> Vec<DataSplit> {
    let k = k.min(n);
    if k < 2 {
        return Vec::new();
    }

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;

    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        let end = start + size;
        folds.push(DataSplit {
            train_indices: (0..start).chain(end..n).collect(),
            test_indices: (start..end).collect(),
        });
        start = end;
    }

    folds
}
