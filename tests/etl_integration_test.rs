/// Integration tests for the ETL stage
///
/// CSV inputs are written to a scratch directory, processed into SQLite and
/// read back through the store.
mod common;

use common::{corpus, write_corpus_csvs, write_csvs, CATEGORIES};
use disaster_response::{
    config::StorageConfig,
    error::AppError,
    etl,
    storage::{SqliteStore, FIXED_COLUMNS},
};
use std::collections::HashSet;
use tempfile::tempdir;

fn storage() -> StorageConfig {
    StorageConfig::default()
}

#[test]
fn test_single_message_end_to_end() {
    let dir = tempdir().unwrap();
    let (messages, categories) = write_csvs(
        dir.path(),
        "id,message,original,genre\n1,Water is urgently needed,,direct\n",
        "id,categories\n1,related-1;water-1;food-0\n",
    );
    let db = dir.path().join("out.db");

    let summary = etl::run(&messages, &categories, &db, &storage()).unwrap();
    assert_eq!(summary.rows_written, 1);
    assert_eq!(summary.categories, vec!["related", "water", "food"]);

    let store = SqliteStore::open(&db, storage().table_name).unwrap();
    assert_eq!(
        store.columns().unwrap(),
        vec!["id", "message", "original", "genre", "related", "water", "food"]
    );

    let dataset = store.load_dataset().unwrap();
    assert_eq!(dataset.len(), 1);
    let row = &dataset.records[0];
    assert_eq!(row.id, 1);
    assert_eq!(row.message, "Water is urgently needed");
    assert_eq!(row.flag(&dataset.schema, "related"), Some(1));
    assert_eq!(row.flag(&dataset.schema, "water"), Some(1));
    assert_eq!(row.flag(&dataset.schema, "food"), Some(0));
}

#[test]
fn test_ids_exist_in_both_sources_and_are_unique() {
    let dir = tempdir().unwrap();
    let (messages, categories) = write_csvs(
        dir.path(),
        "id,message,original,genre\n\
         1,first,,direct\n\
         2,second,,news\n\
         2,second again,,news\n\
         4,only a message,,social\n",
        "id,categories\n\
         1,related-1;water-0\n\
         2,related-1;water-1\n\
         2,related-0;water-0\n\
         3,related-1;water-1\n",
    );
    let db = dir.path().join("out.db");

    let summary = etl::run(&messages, &categories, &db, &storage()).unwrap();
    assert_eq!(summary.duplicate_messages, 1);
    assert_eq!(summary.duplicate_categories, 1);

    let dataset = SqliteStore::open(&db, storage().table_name)
        .unwrap()
        .load_dataset()
        .unwrap();
    let ids: Vec<i64> = dataset.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    // First occurrence wins for both inputs
    let second = &dataset.records[1];
    assert_eq!(second.message, "second");
    assert_eq!(second.flag(&dataset.schema, "water"), Some(1));
}

#[test]
fn test_no_value_other_than_zero_or_one_survives() {
    let dir = tempdir().unwrap();
    let (messages, categories) = write_csvs(
        dir.path(),
        "id,message,original,genre\n1,a,,direct\n2,b,,direct\n",
        "id,categories\n1,related-2;water-1\n2,related-0;water-0\n",
    );
    let db = dir.path().join("out.db");

    let summary = etl::run(&messages, &categories, &db, &storage()).unwrap();
    assert_eq!(summary.coerced_flags, 1);

    let dataset = SqliteStore::open(&db, storage().table_name)
        .unwrap()
        .load_dataset()
        .unwrap();
    for record in &dataset.records {
        assert!(record.flags.iter().all(|&f| f <= 1));
    }
    assert_eq!(dataset.records[0].flag(&dataset.schema, "related"), Some(1));
}

#[test]
fn test_corpus_round_trips_row_for_row() {
    let dir = tempdir().unwrap();
    let (messages, categories) = write_corpus_csvs(dir.path());
    let db = dir.path().join("out.db");

    let summary = etl::run(&messages, &categories, &db, &storage()).unwrap();
    assert_eq!(summary.rows_written, corpus().len());

    let dataset = SqliteStore::open(&db, storage().table_name)
        .unwrap()
        .load_dataset()
        .unwrap();
    assert_eq!(dataset.schema.names(), CATEGORIES);

    for ((id, message, genre, flags), record) in corpus().into_iter().zip(&dataset.records) {
        assert_eq!(record.id, id);
        assert_eq!(record.message, message);
        assert_eq!(record.genre, genre);
        assert_eq!(record.flags, flags.to_vec());
        assert_eq!(record.original, None);
    }
}

#[test]
fn test_rerun_replaces_table() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("out.db");

    let (messages, categories) = write_corpus_csvs(dir.path());
    etl::run(&messages, &categories, &db, &storage()).unwrap();

    let (messages, categories) = write_csvs(
        dir.path(),
        "id,message,original,genre\n7,later,,news\n",
        "id,categories\n7,aid_related-1\n",
    );
    etl::run(&messages, &categories, &db, &storage()).unwrap();

    let store = SqliteStore::open(&db, storage().table_name).unwrap();
    let dataset = store.load_dataset().unwrap();
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.schema.names(), ["aid_related"]);
    assert_eq!(store.columns().unwrap().len(), FIXED_COLUMNS.len() + 1);
}

#[test]
fn test_malformed_flag_is_rejected() {
    let dir = tempdir().unwrap();
    let (messages, categories) = write_csvs(
        dir.path(),
        "id,message,original,genre\n1,a,,direct\n",
        "id,categories\n1,related-7;water-1\n",
    );

    let result = etl::run(&messages, &categories, &dir.path().join("out.db"), &storage());
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn test_missing_input_file() {
    let dir = tempdir().unwrap();
    let result = etl::run(
        &dir.path().join("nope.csv"),
        &dir.path().join("nope2.csv"),
        &dir.path().join("out.db"),
        &storage(),
    );
    assert!(result.is_err());
}
