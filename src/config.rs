use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Persisted table location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Serialized model location
    #[serde(default)]
    pub model: ModelConfig,

    /// Feature extraction configuration
    #[serde(default)]
    pub features: FeatureConfig,

    /// Training configuration
    #[serde(default)]
    pub training: TrainingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, an optional file and
    /// the environment.
    ///
    /// The file is taken from `path` when given, otherwise from `DRP_CONFIG`.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let config_path = path
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| std::env::var("DRP_CONFIG").ok());

        let mut builder = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ));

        if let Some(config_path) = config_path {
            // An explicitly named file must exist
            builder = builder.add_source(config::File::with_name(&config_path).required(true));
        }

        builder
            // Override with environment variables (prefix: DRP_)
            .add_source(
                config::Environment::with_prefix("DRP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("training.n_estimators"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Name of the single message table
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            table_name: default_table_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Serialized classifier pipeline
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
        }
    }
}

/// Bag-of-words vocabulary limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Maximum vocabulary size for text features
    #[serde(default = "default_max_vocab_size")]
    pub max_vocab_size: usize,

    /// Minimum document frequency for terms
    #[serde(default = "default_min_doc_freq")]
    pub min_doc_freq: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_vocab_size: default_max_vocab_size(),
            min_doc_freq: default_min_doc_freq(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    /// Ensemble sizes tried by the grid search
    #[serde(default = "default_n_estimators")]
    pub n_estimators: Vec<u16>,

    /// Cross-validation folds per grid candidate
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,

    /// Seed for the split and the forests
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Optional depth limit for each tree
    #[serde(default)]
    pub max_depth: Option<u16>,

    /// Features tried per split (default `sqrt(n_features)`)
    #[serde(default)]
    pub max_features: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            n_estimators: default_n_estimators(),
            cv_folds: default_cv_folds(),
            seed: default_seed(),
            max_depth: None,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/DisasterResponse.db")
}

fn default_table_name() -> String {
    "DisasterResponseData".to_string()
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/classifier.bin")
}

fn default_max_vocab_size() -> usize {
    2000
}

fn default_min_doc_freq() -> usize {
    1
}

fn default_test_size() -> f64 {
    0.2
}

fn default_n_estimators() -> Vec<u16> {
    vec![5, 10]
}

fn default_cv_folds() -> usize {
    5
}

fn default_seed() -> u64 {
    1
}
