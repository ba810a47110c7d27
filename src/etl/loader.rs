//! CSV extraction, per-input deduplication and the inner join on `id`.

use crate::error::Result;
use crate::models::{MergedRow, RawCategories, RawMessage};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Anything keyed by the shared message id
pub trait Keyed {
    fn id(&self) -> i64;
}

impl Keyed for RawMessage {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Keyed for RawCategories {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Read every row of a headed CSV file
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)?;

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()?;

    debug!(path = %path.display(), rows = rows.len(), "CSV loaded");
    Ok(rows)
}

pub fn load_messages(path: &Path) -> Result<Vec<RawMessage>> {
    read_csv(path)
}

pub fn load_categories(path: &Path) -> Result<Vec<RawCategories>> {
    read_csv(path)
}

/// Keep the first row for every id. Returns the number of rows dropped.
pub fn drop_duplicate_ids<T: Keyed>(rows: &mut Vec<T>) -> usize {
    let before = rows.len();
    let mut seen = HashSet::with_capacity(before);
    rows.retain(|row| seen.insert(row.id()));
    before - rows.len()
}

/// Inner join on id, in categories order. Ids missing from either side are dropped.
pub fn merge(categories: Vec<RawCategories>, messages: Vec<RawMessage>) -> Vec<MergedRow> {
    let n_categories = categories.len();
    let n_messages = messages.len();
    let mut by_id: HashMap<i64, RawMessage> =
        messages.into_iter().map(|m| (m.id, m)).collect();

    let merged: Vec<MergedRow> = categories
        .into_iter()
        .filter_map(|cat| {
            by_id.remove(&cat.id).map(|msg| MergedRow {
                id: cat.id,
                categories: cat.categories,
                message: msg.message,
                original: msg.original,
                genre: msg.genre,
            })
        })
        .collect();

    info!(
        categories = n_categories,
        messages = n_messages,
        merged = merged.len(),
        "Merge completed"
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn message(id: i64, text: &str) -> RawMessage {
        RawMessage {
            id,
            message: text.to_string(),
            original: None,
            genre: "direct".to_string(),
        }
    }

    fn categories(id: i64, packed: &str) -> RawCategories {
        RawCategories {
            id,
            categories: packed.to_string(),
        }
    }

    #[test]
    fn test_drop_duplicates_keeps_first() {
        let mut rows = vec![message(1, "first"), message(2, "other"), message(1, "second")];

        let dropped = drop_duplicate_ids(&mut rows);

        assert_eq!(dropped, 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].message, "first");
    }

    #[test]
    fn test_merge_is_inner_join() {
        let merged = merge(
            vec![categories(3, "water-1"), categories(1, "water-0"), categories(9, "water-1")],
            vec![message(1, "one"), message(3, "three"), message(4, "four")],
        );

        let ids: Vec<i64> = merged.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(merged[0].message, "three");
        assert_eq!(merged[1].categories, "water-0");
    }

    #[test]
    fn test_read_csv_handles_quoted_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "id,message,original,genre\n\
             2,\"Water, food and\nshelter needed\",,direct\n\
             7,Is the storm over,Eske tanpet la fini,social\n"
        )
        .unwrap();

        let rows = load_messages(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].message, "Water, food and\nshelter needed");
        assert_eq!(rows[0].original, None);
        assert_eq!(rows[1].original.as_deref(), Some("Eske tanpet la fini"));
        assert_eq!(rows[1].genre, "social");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_categories(Path::new("/nonexistent/categories.csv")).is_err());
    }
}
