//! Expansion of the packed categories field into per-category flags.

use crate::error::{AppError, Result};
use crate::models::schema::pair_name;
use crate::models::{CategorySchema, Dataset, MergedRow, MessageRecord};
use std::collections::HashSet;
use tracing::{info, warn};

/// Raw value that some rows carry instead of 1 (observed in `related`)
const MISCODED_FLAG: u8 = 2;

/// Counters gathered while cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Flags rewritten from 2 to 1
    pub coerced_flags: usize,
    /// Duplicate ids left after cleaning
    pub duplicate_ids: usize,
}

/// Parse one packed field against the schema.
///
/// The value of each pair is its trailing character. `2` becomes `1`.
pub fn parse_flags(id: i64, packed: &str, schema: &CategorySchema) -> Result<(Vec<u8>, usize)> {
    let pairs: Vec<&str> = packed.split(';').collect();
    if pairs.len() != schema.len() {
        return Err(AppError::Validation(format!(
            "Message {} has {} category pairs, schema has {}",
            id,
            pairs.len(),
            schema.len()
        )));
    }

    let mut coerced = 0;
    let mut flags = Vec::with_capacity(pairs.len());

    for (pair, expected) in pairs.iter().zip(schema.iter()) {
        let name = pair_name(pair).ok_or_else(|| {
            AppError::Validation(format!("Message {} has malformed pair '{}'", id, pair))
        })?;
        if name != expected {
            return Err(AppError::Validation(format!(
                "Message {} has category '{}' where '{}' was expected",
                id, name, expected
            )));
        }

        let value = pair
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| {
                AppError::Validation(format!("Message {} has non-numeric pair '{}'", id, pair))
            })? as u8;

        let flag = match value {
            0 | 1 => value,
            MISCODED_FLAG => {
                coerced += 1;
                1
            }
            other => {
                return Err(AppError::Validation(format!(
                    "Message {} has category '{}' with value {}",
                    id, name, other
                )))
            }
        };
        flags.push(flag);
    }

    Ok((flags, coerced))
}

/// Turn joined rows into the cleaned dataset.
///
/// The schema comes from the first row. An empty input yields an empty
/// dataset with an empty schema.
pub fn clean(rows: Vec<MergedRow>) -> Result<(Dataset, CleanStats)> {
    let schema = match rows.first() {
        Some(first) => CategorySchema::from_packed(&first.categories)?,
        None => {
            warn!("No rows to clean");
            return Ok((Dataset::default(), CleanStats::default()));
        }
    };

    let mut stats = CleanStats::default();
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let (flags, coerced) = parse_flags(row.id, &row.categories, &schema)?;
        stats.coerced_flags += coerced;
        records.push(MessageRecord {
            id: row.id,
            message: row.message,
            original: row.original,
            genre: row.genre,
            flags,
        });
    }

    let mut seen = HashSet::with_capacity(records.len());
    stats.duplicate_ids = records.iter().filter(|r| !seen.insert(r.id)).count();

    info!(
        categories = schema.len(),
        coerced_flags = stats.coerced_flags,
        "Number of duplicates: {}",
        stats.duplicate_ids
    );

    let dataset = Dataset::new(schema, records)?;
    Ok((dataset, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, packed: &str) -> MergedRow {
        MergedRow {
            id,
            categories: packed.to_string(),
            message: "Water is urgently needed".to_string(),
            original: None,
            genre: "direct".to_string(),
        }
    }

    #[test]
    fn test_parse_flags() {
        let schema = CategorySchema::from_packed("related-1;water-1;food-0").unwrap();
        let (flags, coerced) = parse_flags(1, "related-2;water-0;food-1", &schema).unwrap();

        assert_eq!(flags, vec![1, 0, 1]);
        assert_eq!(coerced, 1);
    }

    #[test]
    fn test_parse_flags_rejects_schema_drift() {
        let schema = CategorySchema::from_packed("related-1;water-1").unwrap();

        assert!(parse_flags(1, "related-1", &schema).is_err());
        assert!(parse_flags(1, "related-1;food-1", &schema).is_err());
        assert!(parse_flags(1, "related-1;water-x", &schema).is_err());
        assert!(parse_flags(1, "related-1;water-7", &schema).is_err());
    }

    #[test]
    fn test_clean_expands_categories() {
        let (dataset, stats) = clean(vec![
            row(1, "related-1;water-1;food-0"),
            row(2, "related-2;water-0;food-0"),
        ])
        .unwrap();

        assert_eq!(dataset.schema.names(), &["related", "water", "food"]);
        assert_eq!(dataset.records[0].flags, vec![1, 1, 0]);
        assert_eq!(dataset.records[1].flags, vec![1, 0, 0]);
        assert_eq!(stats.coerced_flags, 1);
        assert_eq!(stats.duplicate_ids, 0);
    }

    #[test]
    fn test_clean_empty_input() {
        let (dataset, stats) = clean(Vec::new()).unwrap();

        assert!(dataset.is_empty());
        assert!(dataset.schema.is_empty());
        assert_eq!(stats, CleanStats::default());
    }
}
