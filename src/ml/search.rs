use crate::error::{AppError, Result};
use crate::ml::classifier::MultiOutputClassifier;
use crate::ml::features::FeatureMatrix;
use crate::ml::models::{CandidateScore, ForestParams};
use crate::ml::split::k_fold;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Outcome of a grid search over ensemble sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    /// Selected ensemble size
    pub best_n_trees: u16,

    /// Cross-validation scores per candidate, in grid order
    pub scores: Vec<CandidateScore>,
}

/// Exhaustive search over `n_trees` candidates with k-fold cross validation
#[derive(Debug, Clone)]
pub struct GridSearch {
    candidates: Vec<u16>,
    cv_folds: usize,
    base: ForestParams,
}

impl GridSearch {
    pub fn new(candidates: Vec<u16>, cv_folds: usize, base: ForestParams) -> Result<Self> {
        if candidates.is_empty() {
            return Err(AppError::Configuration(
                "Grid search needs at least one n_estimators candidate".to_string(),
            ));
        }
        if candidates.contains(&0) {
            return Err(AppError::Configuration(
                "n_estimators candidates must be positive".to_string(),
            ));
        }
        Ok(Self {
            candidates,
            cv_folds,
            base,
        })
    }

    /// Score every candidate and pick the best mean subset accuracy.
    ///
    /// Ties go to the earlier candidate. With fewer than two folds the first
    /// candidate is returned unscored.
    pub fn run(&self, features: &FeatureMatrix, labels: &Array2<u8>) -> Result<GridSearchResult> {
        let folds = k_fold(features.n_rows(), self.cv_folds);
        if folds.is_empty() {
            info!("Too few rows for cross validation, using first candidate");
            return Ok(GridSearchResult {
                best_n_trees: self.candidates[0],
                scores: Vec::new(),
            });
        }

        let mut fold_scores: Vec<Vec<f64>> = vec![Vec::with_capacity(folds.len()); self.candidates.len()];

        for (fold_idx, fold) in folds.iter().enumerate() {
            let x_train = features.to_dense(&fold.train_indices);
            let x_test = features.to_dense(&fold.test_indices);
            let y_train = labels.select(Axis(0), &fold.train_indices);
            let y_test = labels.select(Axis(0), &fold.test_indices);

            for (cand_idx, &n_trees) in self.candidates.iter().enumerate() {
                let params = ForestParams {
                    n_trees,
                    ..self.base
                };
                let model = MultiOutputClassifier::fit(&x_train, &y_train, params)?;
                let predicted = model.predict(&x_test)?;
                let score = subset_accuracy(&y_test, &predicted);

                debug!(fold = fold_idx, n_trees, score, "Grid candidate scored");
                fold_scores[cand_idx].push(score);
            }
        }

        let scores: Vec<CandidateScore> = self
            .candidates
            .iter()
            .zip(fold_scores)
            .map(|(&n_trees, fold_scores)| {
                let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
                CandidateScore {
                    n_trees,
                    fold_scores,
                    mean_score,
                }
            })
            .collect();

        let mut best = &scores[0];
        for candidate in &scores[1..] {
            if candidate.mean_score > best.mean_score {
                best = candidate;
            }
        }

        info!(
            best_n_trees = best.n_trees,
            mean_score = best.mean_score,
            folds = folds.len(),
            "Grid search completed"
        );

        Ok(GridSearchResult {
            best_n_trees: best.n_trees,
            scores,
        })
    }
}

/// Fraction of rows whose whole label vector is predicted exactly
pub fn subset_accuracy(y_true: &Array2<u8>, y_pred: &Array2<u8>) -> f64 {
    let n_rows = y_true.nrows();
    if n_rows == 0 {
        return 0.0;
    }
    let exact = y_true
        .outer_iter()
        .zip(y_pred.outer_iter())
        .filter(|(t, p)| t == p)
        .count();
    exact as f64 / n_rows as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (FeatureMatrix, Array2<u8>) {
        let rows = (0..20)
            .map(|i| if i % 2 == 0 { vec![(0, 1.0)] } else { vec![] })
            .collect();
        let mut labels = Array2::zeros((20, 2));
        for i in 0..20 {
            labels[[i, 0]] = u8::from(i % 2 == 0);
            labels[[i, 1]] = u8::from(i % 2 == 1);
        }
        (FeatureMatrix::new(1, rows), labels)
    }

    #[test]
    fn test_subset_accuracy() {
        let y_true = array![[1u8, 0], [0, 1], [1, 1]];
        let y_pred = array![[1u8, 0], [0, 0], [1, 1]];

        assert!((subset_accuracy(&y_true, &y_pred) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_grid_search_scores_every_candidate() {
        let (features, labels) = separable();
        let search = GridSearch::new(vec![5, 10], 5, ForestParams::default()).unwrap();

        let result = search.run(&features, &labels).unwrap();

        assert_eq!(result.scores.len(), 2);
        assert_eq!(result.scores[0].fold_scores.len(), 5);
        // Both candidates separate the data perfectly, so the first wins the tie
        assert_eq!(result.best_n_trees, 5);
        assert_eq!(result.scores[0].mean_score, 1.0);
    }

    #[test]
    fn test_single_row_skips_cross_validation() {
        let features = FeatureMatrix::new(1, vec![vec![(0, 1.0)]]);
        let labels = array![[1u8]];
        let search = GridSearch::new(vec![3, 7], 5, ForestParams::default()).unwrap();

        let result = search.run(&features, &labels).unwrap();
        assert_eq!(result.best_n_trees, 3);
        assert!(result.scores.is_empty());
    }

    #[test]
    fn test_invalid_grid_rejected() {
        assert!(GridSearch::new(Vec::new(), 5, ForestParams::default()).is_err());
        assert!(GridSearch::new(vec![0], 5, ForestParams::default()).is_err());
    }
}
