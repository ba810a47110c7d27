use crate::config::{FeatureConfig, TrainingConfig};
use crate::error::{AppError, Result};
use crate::ml::classifier::MultiOutputClassifier;
use crate::ml::features::FeatureExtractor;
use crate::ml::models::{ForestParams, ModelMetadata};
use crate::ml::search::{GridSearch, GridSearchResult};
use crate::ml::text::tokenize;
use crate::models::CategorySchema;
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Tokenizer, TF-IDF features and the multi-output forest, fitted together.
///
/// This is the unit written to and read from the model file.
#[derive(Serialize, Deserialize)]
pub struct ClassifierPipeline {
    metadata: ModelMetadata,
    category_names: Vec<String>,
    extractor: FeatureExtractor,
    classifier: MultiOutputClassifier,
}

impl ClassifierPipeline {
    /// Fit on raw message texts and their label matrix.
    ///
    /// The grid search picks `n_estimators`, then the winner is refit on
    /// every row passed in.
    pub fn fit(
        texts: &[&str],
        labels: &Array2<u8>,
        schema: &CategorySchema,
        features: &FeatureConfig,
        training: &TrainingConfig,
    ) -> Result<(Self, GridSearchResult)> {
        if texts.len() != labels.nrows() {
            return Err(AppError::Model(format!(
                "{} messages but {} label rows",
                texts.len(),
                labels.nrows()
            )));
        }
        if labels.ncols() != schema.len() {
            return Err(AppError::Validation(format!(
                "Label matrix has {} columns, schema has {} categories",
                labels.ncols(),
                schema.len()
            )));
        }

        let documents: Vec<Vec<String>> = texts.par_iter().map(|t| tokenize(t)).collect();

        let mut extractor = FeatureExtractor::new(features.clone());
        let matrix = extractor.fit_transform(&documents)?;
        info!(
            documents = matrix.n_rows(),
            vocabulary = extractor.vocab_size(),
            "TF-IDF features extracted"
        );

        let base = ForestParams {
            n_trees: training.n_estimators.first().copied().unwrap_or(10),
            max_depth: training.max_depth,
            max_features: training.max_features,
            seed: training.seed,
        };
        let search = GridSearch::new(training.n_estimators.clone(), training.cv_folds, base)?;
        let grid = search.run(&matrix, labels)?;

        let params = ForestParams {
            n_trees: grid.best_n_trees,
            ..base
        };
        let classifier = MultiOutputClassifier::fit(&matrix.to_dense_all(), labels, params)?;

        let mut metadata = ModelMetadata::new("tfidf-random-forest");
        metadata.n_training_samples = texts.len();
        metadata.n_features = extractor.n_features();
        metadata.n_categories = schema.len();
        metadata
            .hyperparameters
            .insert("n_estimators".to_string(), params.n_trees.to_string());
        metadata
            .hyperparameters
            .insert("seed".to_string(), params.seed.to_string());
        if let Some(depth) = params.max_depth {
            metadata
                .hyperparameters
                .insert("max_depth".to_string(), depth.to_string());
        }
        if let Some(m) = params.max_features {
            metadata
                .hyperparameters
                .insert("max_features".to_string(), m.to_string());
        }
        metadata.grid_scores = grid.scores.clone();

        let pipeline = Self {
            metadata,
            category_names: schema.names().to_vec(),
            extractor,
            classifier,
        };

        Ok((pipeline, grid))
    }

    /// Predict a (n_texts × n_categories) flag matrix
    pub fn predict_batch(&self, texts: &[&str]) -> Result<Array2<u8>> {
        let documents: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();
        let matrix = self.extractor.transform_all(&documents)?;
        let predicted = self.classifier.predict(&matrix.to_dense_all())?;

        if predicted.ncols() != self.category_names.len() {
            return Err(AppError::Model(format!(
                "Classifier produced {} outputs for {} categories",
                predicted.ncols(),
                self.category_names.len()
            )));
        }
        Ok(predicted)
    }

    /// One flag per category for a single message
    pub fn predict(&self, text: &str) -> Result<Vec<u8>> {
        let predicted = self.predict_batch(&[text])?;
        Ok(predicted.row(0).to_vec())
    }

    /// Flags paired with their category names, in schema order
    pub fn predict_labeled(&self, text: &str) -> Result<Vec<(String, u8)>> {
        let flags = self.predict(text)?;
        Ok(self.category_names.iter().cloned().zip(flags).collect())
    }

    pub fn category_names(&self) -> &[String] {
        &self.category_names
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn n_features(&self) -> usize {
        self.extractor.n_features()
    }

    /// Write the pipeline as a bincode blob, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;

        info!(path = %path.display(), "Model saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                AppError::NotFound(format!("Model file {}", path.display()))
            }
            _ => AppError::Io(e),
        })?;
        let pipeline: Self = bincode::deserialize_from(BufReader::new(file))?;

        info!(
            path = %path.display(),
            categories = pipeline.category_names.len(),
            features = pipeline.n_features(),
            "Model loaded"
        );
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> (Vec<&'static str>, Array2<u8>, CategorySchema) {
        let texts = vec![
            "We need water",
            "Storm destroyed the roof",
            "We need water",
            "Roof damaged by the storm",
            "Water please",
            "Storm is coming",
            "We need water",
            "The storm flattened houses",
            "Need water",
            "Storm warning tonight",
        ];
        let schema = CategorySchema::from_packed("related-1;water-1;weather-1").unwrap();
        let mut labels = Array2::zeros((texts.len(), 3));
        for (i, text) in texts.iter().enumerate() {
            let water = text.to_lowercase().contains("water");
            labels[[i, 0]] = 1;
            labels[[i, 1]] = u8::from(water);
            labels[[i, 2]] = u8::from(!water);
        }
        (texts, labels, schema)
    }

    #[test]
    fn test_fit_and_predict_labeled() {
        let (texts, labels, schema) = corpus();
        let training = TrainingConfig {
            cv_folds: 2,
            max_features: Some(usize::MAX),
            ..Default::default()
        };

        let (pipeline, grid) =
            ClassifierPipeline::fit(&texts, &labels, &schema, &FeatureConfig::default(), &training)
                .unwrap();

        assert!(training.n_estimators.contains(&grid.best_n_trees));
        assert_eq!(pipeline.category_names(), schema.names());

        let labeled = pipeline.predict_labeled("We need water").unwrap();
        assert_eq!(labeled.len(), 3);
        assert_eq!(labeled[0], ("related".to_string(), 1));
        assert_eq!(labeled[1], ("water".to_string(), 1));
    }

    #[test]
    fn test_metadata_describes_fitted_model() {
        let (texts, labels, schema) = corpus();
        let training = TrainingConfig {
            cv_folds: 2,
            max_depth: Some(4),
            ..Default::default()
        };

        let (pipeline, grid) =
            ClassifierPipeline::fit(&texts, &labels, &schema, &FeatureConfig::default(), &training)
                .unwrap();

        let metadata = pipeline.metadata();
        assert_eq!(metadata.n_categories, 3);
        assert_eq!(metadata.n_training_samples, texts.len());
        assert_eq!(metadata.n_features, pipeline.n_features());
        assert_eq!(
            metadata.hyperparameters.get("n_estimators"),
            Some(&grid.best_n_trees.to_string())
        );
        assert_eq!(metadata.hyperparameters.get("max_depth"), Some(&"4".to_string()));
        assert!(!metadata.hyperparameters.contains_key("max_features"));
        assert_eq!(metadata.grid_scores.len(), training.n_estimators.len());
    }

    #[test]
    fn test_save_and_load() {
        let (texts, labels, schema) = corpus();
        let (pipeline, _) = ClassifierPipeline::fit(
            &texts,
            &labels,
            &schema,
            &FeatureConfig::default(),
            &TrainingConfig::default(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.bin");
        pipeline.save(&path).unwrap();

        let loaded = ClassifierPipeline::load(&path).unwrap();
        assert_eq!(loaded.category_names(), pipeline.category_names());
        assert_eq!(
            loaded.predict("We need water").unwrap(),
            pipeline.predict("We need water").unwrap()
        );
    }

    #[test]
    fn test_missing_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClassifierPipeline::load(&dir.path().join("absent.bin"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_label_width_must_match_schema() {
        let (texts, labels, _) = corpus();
        let narrow = CategorySchema::from_packed("related-1").unwrap();
        let result = ClassifierPipeline::fit(
            &texts,
            &labels,
            &narrow,
            &FeatureConfig::default(),
            &TrainingConfig::default(),
        );
        assert!(result.is_err());
    }
}
