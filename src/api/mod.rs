pub mod handlers;
pub mod routes;
pub mod templates;

pub use routes::*;
pub use templates::Templates;

use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::{AppError, Result};
use crate::ml::ClassifierPipeline;
use crate::models::Dataset;
use crate::storage::open_store;
use std::sync::Arc;
use tracing::info;

/// Shared application state, built once at startup and read-only afterwards
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub model: Arc<ClassifierPipeline>,
    pub dashboard: Arc<Dashboard>,
    pub templates: Arc<Templates>,
}

impl AppState {
    /// Build the state from an already loaded table and model.
    ///
    /// The model must predict exactly the table's category columns.
    pub fn new(dataset: Dataset, model: ClassifierPipeline) -> Result<Self> {
        if model.category_names() != dataset.schema.names() {
            return Err(AppError::Validation(format!(
                "Model categories {:?} do not match table categories {:?}",
                model.category_names(),
                dataset.schema.names()
            )));
        }

        let dashboard = Dashboard::build(&dataset);
        Ok(Self {
            dataset: Arc::new(dataset),
            model: Arc::new(model),
            dashboard: Arc::new(dashboard),
            templates: Arc::new(Templates::new()?),
        })
    }

    /// Load the table and model named by the configuration
    pub fn load(config: &Config) -> Result<Self> {
        let store = open_store(&config.storage)?;
        let dataset = store.load_dataset()?;
        info!(
            database = %config.storage.database_path.display(),
            table = store.table_name(),
            messages = dataset.len(),
            categories = dataset.schema.len(),
            "Dataset loaded"
        );

        let model = ClassifierPipeline::load(&config.model.model_path)?;
        Self::new(dataset, model)
    }
}
