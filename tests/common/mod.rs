//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use disaster_response::config::{Config, FeatureConfig, TrainingConfig};
use std::fs;
use std::path::{Path, PathBuf};

pub const CATEGORIES: [&str; 4] = ["related", "water", "food", "shelter"];

/// Messages and packed categories for a small, cleanly separable corpus.
///
/// Every water message tokenizes to the same terms as "we need water" and no
/// other message mentions water.
pub fn corpus() -> Vec<(i64, &'static str, &'static str, [u8; 4])> {
    vec![
        (1, "We need water", "direct", [1, 1, 0, 0]),
        (2, "Food supplies are gone", "direct", [1, 0, 1, 0]),
        (3, "Houses destroyed, tents required", "news", [1, 0, 0, 1]),
        (4, "We need water!", "social", [1, 1, 0, 0]),
        (5, "No food left in the village", "direct", [1, 0, 1, 0]),
        (6, "Our roof collapsed", "direct", [1, 0, 0, 1]),
        (7, "Need water", "news", [1, 1, 0, 0]),
        (8, "Send food to the camp", "social", [1, 0, 1, 0]),
        (9, "Tents needed for families", "news", [1, 0, 0, 1]),
        (10, "we NEED water", "direct", [1, 1, 0, 0]),
        (11, "Children are hungry, food needed", "direct", [1, 0, 1, 0]),
        (12, "Shelter destroyed by the storm", "news", [1, 0, 0, 1]),
        (13, "We need water", "social", [1, 1, 0, 0]),
        (14, "Food distribution stopped", "news", [1, 0, 1, 0]),
        (15, "Homes flooded last night", "direct", [1, 0, 0, 1]),
        (16, "Need water.", "direct", [1, 1, 0, 0]),
        (17, "We have no food", "social", [1, 0, 1, 0]),
        (18, "Families sleeping outside", "news", [1, 0, 0, 1]),
        (19, "We need water", "direct", [1, 1, 0, 0]),
        (20, "Rice and beans please", "direct", [1, 0, 1, 0]),
    ]
}

pub fn packed(flags: &[u8; 4]) -> String {
    CATEGORIES
        .iter()
        .zip(flags)
        .map(|(name, flag)| format!("{}-{}", name, flag))
        .collect::<Vec<_>>()
        .join(";")
}

/// Write the corpus as the two input CSVs; returns (messages, categories)
pub fn write_corpus_csvs(dir: &Path) -> (PathBuf, PathBuf) {
    let mut messages = String::from("id,message,original,genre\n");
    let mut categories = String::from("id,categories\n");
    for (id, message, genre, flags) in corpus() {
        messages.push_str(&format!("{},\"{}\",,{}\n", id, message, genre));
        categories.push_str(&format!("{},{}\n", id, packed(&flags)));
    }
    write_csvs(dir, &messages, &categories)
}

pub fn write_csvs(dir: &Path, messages: &str, categories: &str) -> (PathBuf, PathBuf) {
    let messages_path = dir.join("messages.csv");
    let categories_path = dir.join("categories.csv");
    fs::write(&messages_path, messages).unwrap();
    fs::write(&categories_path, categories).unwrap();
    (messages_path, categories_path)
}

/// Configuration pointing at files inside `dir`, tuned for tiny corpora
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.database_path = dir.join("DisasterResponse.db");
    config.model.model_path = dir.join("models").join("classifier.bin");
    config.features = FeatureConfig::default();
    config.training = TrainingConfig {
        cv_folds: 3,
        max_features: Some(usize::MAX),
        ..TrainingConfig::default()
    };
    config
}
