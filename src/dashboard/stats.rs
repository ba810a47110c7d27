//! Aggregates over the cleaned table for the overview charts.

use crate::ml::text::is_stopword;
use crate::models::Dataset;
use std::collections::{BTreeMap, HashMap};

/// Message count per genre, sorted by genre name
pub fn genre_counts(dataset: &Dataset) -> Vec<(String, u64)> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in &dataset.records {
        *counts.entry(record.genre.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(genre, count)| (genre.to_string(), count))
        .collect()
}

/// Sum of each category's flags, in schema order
pub fn category_counts(dataset: &Dataset) -> Vec<(String, u64)> {
    let mut sums = vec![0u64; dataset.schema.len()];
    for record in &dataset.records {
        for (sum, &flag) in sums.iter_mut().zip(&record.flags) {
            *sum += u64::from(flag);
        }
    }
    dataset.schema.iter().map(str::to_string).zip(sums).collect()
}

/// Most frequent words across all messages.
///
/// Words are the lowercased message text split on whitespace, without
/// stopwords. Equal counts keep the order in which the words first appear.
pub fn top_words(dataset: &Dataset, n: usize) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
    let mut next_seen = 0usize;

    for record in &dataset.records {
        for word in record.message.to_lowercase().split_whitespace() {
            if is_stopword(word) {
                continue;
            }
            let entry = counts.entry(word.to_string()).or_insert_with(|| {
                next_seen += 1;
                (0, next_seen)
            });
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<(String, (u64, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.truncate(n);
    ranked
        .into_iter()
        .map(|(word, (count, _))| (word, count))
        .collect()
}
