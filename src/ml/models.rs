use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hyperparameters of one random forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_trees: u16,

    /// Optional depth limit for each tree
    pub max_depth: Option<u16>,

    /// Features tried per split; `None` means `sqrt(n_features)`
    pub max_features: Option<usize>,

    /// Base seed; each category offsets it by its position
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 10,
            max_depth: None,
            max_features: None,
            seed: 1,
        }
    }
}

/// Cross-validation result for one grid candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Ensemble size tried
    pub n_trees: u16,

    /// Subset accuracy per fold
    pub fold_scores: Vec<f64>,

    /// Mean of the fold scores
    pub mean_score: f64,
}

/// Model metadata stored alongside the fitted pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub n_training_samples: usize,
    pub n_features: usize,
    pub n_categories: usize,
    pub hyperparameters: BTreeMap<String, String>,
    pub grid_scores: Vec<CandidateScore>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trained_at: Utc::now(),
            n_training_samples: 0,
            n_features: 0,
            n_categories: 0,
            hyperparameters: BTreeMap::new(),
            grid_scores: Vec::new(),
        }
    }
}
