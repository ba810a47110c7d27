use crate::error::{AppError, Result};
use crate::ml::models::ForestParams;
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::{debug, warn};

type Forest = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Binary classifier for a single category
#[derive(Serialize, Deserialize)]
pub enum LabelModel {
    /// Every training row had the same value
    Constant(u8),

    /// Random forest over the TF-IDF features
    Forest(Forest),
}

impl LabelModel {
    /// Fit one category. A single-class column becomes a constant predictor.
    pub fn fit(x: &DenseMatrix<f64>, y: ArrayView1<'_, u8>, params: &ForestParams) -> Result<Self> {
        let first = match y.iter().next() {
            Some(&v) => v,
            None => {
                return Err(AppError::Model(
                    "Cannot train a classifier on zero rows".to_string(),
                ))
            }
        };
        if y.iter().all(|&v| v == first) {
            return Ok(LabelModel::Constant(first));
        }

        let labels: Vec<i32> = y.iter().map(|&v| i32::from(v)).collect();

        let mut parameters = RandomForestClassifierParameters::default()
            .with_n_trees(params.n_trees)
            .with_seed(params.seed);
        if let Some(depth) = params.max_depth {
            parameters = parameters.with_max_depth(depth);
        }
        if let Some(m) = params.max_features {
            let (_, n_features) = x.shape();
            parameters = parameters.with_m(m.clamp(1, n_features.max(1)));
        }

        let forest = RandomForestClassifier::fit(x, &labels, parameters).map_err(|e| {
            AppError::Model(format!("Failed to train random forest: {}", e))
        })?;

        Ok(LabelModel::Forest(forest))
    }

    pub fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<u8>> {
        let (n_rows, _) = x.shape();
        match self {
            LabelModel::Constant(value) => Ok(vec![*value; n_rows]),
            LabelModel::Forest(forest) => {
                let predictions = forest.predict(x)?;
                Ok(predictions.into_iter().map(|p| u8::from(p > 0)).collect())
            }
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, LabelModel::Constant(_))
    }
}

/// One independent binary classifier per category
#[derive(Serialize, Deserialize)]
pub struct MultiOutputClassifier {
    estimators: Vec<LabelModel>,
}

impl MultiOutputClassifier {
    /// Fit every label column of `y` against the rows of `x`, in parallel.
    pub fn fit(x: &DenseMatrix<f64>, y: &Array2<u8>, params: ForestParams) -> Result<Self> {
        let (n_rows, _) = x.shape();
        if n_rows != y.nrows() {
            return Err(AppError::Model(format!(
                "Feature rows ({}) and label rows ({}) differ",
                n_rows,
                y.nrows()
            )));
        }

        let columns: Vec<ArrayView1<'_, u8>> = y.columns().into_iter().collect();
        let estimators = columns
            .into_par_iter()
            .enumerate()
            .map(|(idx, column)| {
                let label_params = ForestParams {
                    seed: params.seed.wrapping_add(idx as u64),
                    ..params
                };
                LabelModel::fit(x, column, &label_params)
            })
            .collect::<Result<Vec<_>>>()?;

        let constant = estimators.iter().filter(|e| e.is_constant()).count();
        if constant > 0 {
            warn!(
                categories = constant,
                "Categories with a single class in training rows use a constant predictor"
            );
        }
        debug!(
            categories = estimators.len(),
            n_trees = params.n_trees,
            rows = n_rows,
            "Multi-output classifier fitted"
        );

        Ok(Self { estimators })
    }

    /// Predict a (n_rows × n_categories) matrix of 0/1 flags
    pub fn predict(&self, x: &DenseMatrix<f64>) -> Result<Array2<u8>> {
        let (n_rows, _) = x.shape();
        let mut out = Array2::zeros((n_rows, self.estimators.len()));

        for (col, estimator) in self.estimators.iter().enumerate() {
            let predictions = estimator.predict(x)?;
            for (row, value) in predictions.into_iter().enumerate() {
                out[[row, col]] = value;
            }
        }

        Ok(out)
    }

    pub fn n_outputs(&self) -> usize {
        self.estimators.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn features() -> DenseMatrix<f64> {
        // A single column that fully determines every label
        let data: Vec<f64> = (0..40).map(|i| (i % 2) as f64).collect();
        DenseMatrix::new(40, 1, data, false)
    }

    fn labels() -> Array2<u8> {
        let mut y = Array2::zeros((40, 3));
        for i in 0..40 {
            let present = (i % 2) as u8;
            y[[i, 0]] = present;
            y[[i, 1]] = 1 - present;
            // Third category never fires
            y[[i, 2]] = 0;
        }
        y
    }

    #[test]
    fn test_constant_label() {
        let x = features();
        let y = array![1u8, 1, 1];
        let model = LabelModel::fit(&x, y.view(), &ForestParams::default()).unwrap();

        assert!(model.is_constant());
        assert_eq!(model.predict(&x).unwrap(), vec![1; 40]);
    }

    #[test]
    fn test_multi_output_learns_separable_labels() {
        let x = features();
        let y = labels();

        let classifier = MultiOutputClassifier::fit(&x, &y, ForestParams::default()).unwrap();
        assert_eq!(classifier.n_outputs(), 3);

        let predicted = classifier.predict(&x).unwrap();
        assert_eq!(predicted, y);
    }

    #[test]
    fn test_row_mismatch_is_an_error() {
        let x = features();
        let y = Array2::zeros((3, 2));
        assert!(MultiOutputClassifier::fit(&x, &y, ForestParams::default()).is_err());
    }
}
