/// Machine learning for multi-label message classification
///
/// - Tokenization and noun lemmatization of message text
/// - TF-IDF feature extraction
/// - One random forest per category, fitted in parallel
/// - Grid search over ensemble size with k-fold cross validation
/// - Per-category evaluation reports
pub mod classifier;
pub mod evaluation;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod split;
pub mod text;
pub mod trainer;

pub use classifier::{LabelModel, MultiOutputClassifier};
pub use evaluation::{evaluate, CategoryReport, ClassMetrics, EvaluationReport};
pub use features::{FeatureExtractor, FeatureMatrix, SparseRow};
pub use models::{CandidateScore, ForestParams, ModelMetadata};
pub use pipeline::ClassifierPipeline;
pub use search::{subset_accuracy, GridSearch, GridSearchResult};
pub use split::{k_fold, train_test_split, DataSplit};
pub use text::{is_stopword, lemmatize, normalize, tokenize};
pub use trainer::{train, TrainingSummary};
