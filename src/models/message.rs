use crate::error::{AppError, Result};
use crate::models::CategorySchema;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Row of the messages CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: i64,
    pub message: String,
    #[serde(default)]
    pub original: Option<String>,
    pub genre: String,
}

/// Row of the categories CSV; `categories` is packed as `name-value;...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCategories {
    pub id: i64,
    pub categories: String,
}

/// Result of joining one categories row with its message
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub id: i64,
    pub categories: String,
    pub message: String,
    pub original: Option<String>,
    pub genre: String,
}

/// A cleaned message with one binary flag per schema category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub message: String,
    pub original: Option<String>,
    pub genre: String,
    /// Flags aligned with the dataset's `CategorySchema`
    pub flags: Vec<u8>,
}

impl MessageRecord {
    /// Flag for a named category, if the schema has it
    pub fn flag(&self, schema: &CategorySchema, name: &str) -> Option<u8> {
        schema
            .position(name)
            .and_then(|idx| self.flags.get(idx).copied())
    }
}

/// Cleaned, joined table: the contract between ETL, training and serving
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub schema: CategorySchema,
    pub records: Vec<MessageRecord>,
}

impl Dataset {
    /// Build a dataset, checking every record against the schema.
    pub fn new(schema: CategorySchema, records: Vec<MessageRecord>) -> Result<Self> {
        let dataset = Self { schema, records };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check flag width, flag values and id uniqueness
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::with_capacity(self.records.len());

        for record in &self.records {
            if record.flags.len() != self.schema.len() {
                return Err(AppError::Validation(format!(
                    "Message {} has {} category flags, schema has {}",
                    record.id,
                    record.flags.len(),
                    self.schema.len()
                )));
            }
            if let Some(bad) = record.flags.iter().find(|&&f| f > 1) {
                return Err(AppError::Validation(format!(
                    "Message {} has non-binary category flag {}",
                    record.id, bad
                )));
            }
            if !seen.insert(record.id) {
                return Err(AppError::Validation(format!(
                    "Message id {} is duplicated",
                    record.id
                )));
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Message texts in record order (the feature column)
    pub fn messages(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.message.as_str()).collect()
    }

    /// Label matrix (n_records × n_categories)
    pub fn label_matrix(&self) -> Array2<u8> {
        let n_rows = self.records.len();
        let n_cols = self.schema.len();
        let mut labels = Array2::zeros((n_rows, n_cols));

        for (row, record) in self.records.iter().enumerate() {
            for (col, &flag) in record.flags.iter().enumerate().take(n_cols) {
                labels[[row, col]] = flag;
            }
        }

        labels
    }
}
