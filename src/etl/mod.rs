/// ETL stage: load the two CSV inputs, deduplicate, join, expand the
/// packed categories and persist the result as a single table.
pub mod cleaner;
pub mod loader;

pub use cleaner::{clean, parse_flags, CleanStats};
pub use loader::{drop_duplicate_ids, load_categories, load_messages, merge};

use crate::config::StorageConfig;
use crate::error::Result;
use crate::models::Dataset;
use crate::storage::SqliteStore;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// What one ETL run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EtlSummary {
    pub messages_loaded: usize,
    pub categories_loaded: usize,
    pub duplicate_messages: usize,
    pub duplicate_categories: usize,
    pub rows_written: usize,
    pub coerced_flags: usize,
    pub categories: Vec<String>,
}

/// Load, deduplicate and join the two inputs, then clean the result.
pub fn load_and_clean(messages_path: &Path, categories_path: &Path) -> Result<(Dataset, EtlSummary)> {
    let mut messages = load_messages(messages_path)?;
    let mut categories = load_categories(categories_path)?;

    let mut summary = EtlSummary {
        messages_loaded: messages.len(),
        categories_loaded: categories.len(),
        ..Default::default()
    };

    summary.duplicate_messages = drop_duplicate_ids(&mut messages);
    summary.duplicate_categories = drop_duplicate_ids(&mut categories);
    info!(
        messages = summary.duplicate_messages,
        categories = summary.duplicate_categories,
        "Duplicate ids dropped"
    );

    let merged = merge(categories, messages);

    info!("Cleaning data...");
    let (dataset, stats) = clean(merged)?;
    summary.coerced_flags = stats.coerced_flags;
    summary.categories = dataset.schema.names().to_vec();

    Ok((dataset, summary))
}

/// Full ETL run: CSV inputs in, table written to `database_path`.
pub fn run(
    messages_path: &Path,
    categories_path: &Path,
    database_path: &Path,
    storage: &StorageConfig,
) -> Result<EtlSummary> {
    info!(
        messages = %messages_path.display(),
        categories = %categories_path.display(),
        "Loading data..."
    );
    let (dataset, mut summary) = load_and_clean(messages_path, categories_path)?;

    info!(database = %database_path.display(), "Saving data...");
    let mut store = SqliteStore::open(database_path, storage.table_name.clone())?;
    summary.rows_written = store.replace_dataset(&dataset)?;

    info!(rows = summary.rows_written, "Cleaned data saved to database!");
    Ok(summary)
}
