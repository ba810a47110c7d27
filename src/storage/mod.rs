/// Persisted single-table storage shared by the ETL, training and serving stages
pub mod sqlite;

pub use sqlite::{SqliteStore, FIXED_COLUMNS};

use crate::config::StorageConfig;
use crate::error::Result;

/// Open the store described by the storage configuration
pub fn open_store(config: &StorageConfig) -> Result<SqliteStore> {
    SqliteStore::open(&config.database_path, config.table_name.clone())
}
