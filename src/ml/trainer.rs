//! Training stage: table in, evaluated and serialized pipeline out.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::ml::evaluation::{evaluate, EvaluationReport};
use crate::ml::models::ModelMetadata;
use crate::ml::pipeline::ClassifierPipeline;
use crate::ml::search::GridSearchResult;
use crate::ml::split::train_test_split;
use crate::storage::SqliteStore;
use ndarray::Axis;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// What one training run produced
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub grid: GridSearchResult,
    pub report: EvaluationReport,
    pub metadata: ModelMetadata,
    pub elapsed_ms: u128,
}

/// Load the table, split, fit with grid search, evaluate on the held-out
/// rows and save the fitted pipeline to `model_path`.
pub fn train(database_path: &Path, model_path: &Path, config: &Config) -> Result<TrainingSummary> {
    let started = Instant::now();

    info!(database = %database_path.display(), "Loading data...");
    let store = SqliteStore::open(database_path, config.storage.table_name.clone())?;
    let dataset = store.load_dataset()?;

    if dataset.is_empty() {
        return Err(AppError::Validation(format!(
            "Table {} has no rows to train on",
            config.storage.table_name
        )));
    }
    if dataset.schema.is_empty() {
        return Err(AppError::Validation(format!(
            "Table {} has no category columns",
            config.storage.table_name
        )));
    }

    let texts = dataset.messages();
    let labels = dataset.label_matrix();
    let split = train_test_split(dataset.len(), config.training.test_size, config.training.seed)?;

    let train_texts: Vec<&str> = split.train_indices.iter().map(|&i| texts[i]).collect();
    let test_texts: Vec<&str> = split.test_indices.iter().map(|&i| texts[i]).collect();
    let train_labels = labels.select(Axis(0), &split.train_indices);
    let test_labels = labels.select(Axis(0), &split.test_indices);

    info!(
        train = train_texts.len(),
        test = test_texts.len(),
        categories = dataset.schema.len(),
        "Building model..."
    );

    info!("Training model...");
    let (pipeline, grid) = ClassifierPipeline::fit(
        &train_texts,
        &train_labels,
        &dataset.schema,
        &config.features,
        &config.training,
    )?;

    info!("Evaluating model...");
    let predicted = pipeline.predict_batch(&test_texts)?;
    let report = evaluate(&test_labels, &predicted, &dataset.schema)?;
    info!(
        subset_accuracy = report.subset_accuracy,
        mean_weighted_f1 = report.mean_weighted_f1(),
        "Evaluation completed"
    );

    info!(model = %model_path.display(), "Saving model...");
    pipeline.save(model_path)?;

    let summary = TrainingSummary {
        n_train: train_texts.len(),
        n_test: test_texts.len(),
        n_features: pipeline.n_features(),
        grid,
        report,
        metadata: pipeline.metadata().clone(),
        elapsed_ms: started.elapsed().as_millis(),
    };

    info!(
        elapsed_ms = summary.elapsed_ms as u64,
        best_n_trees = summary.grid.best_n_trees,
        "Trained model saved!"
    );
    Ok(summary)
}
