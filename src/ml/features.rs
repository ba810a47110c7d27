use crate::config::FeatureConfig;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::collections::{HashMap, HashSet};

/// Sparse feature row: (feature index, value) pairs sorted by index
pub type SparseRow = Vec<(usize, f64)>;

/// Bag-of-words counts reweighted by TF-IDF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureExtractor {
    /// Configuration
    config: FeatureConfig,

    /// Vocabulary mapping (term -> index)
    vocabulary: HashMap<String, usize>,

    /// Inverse document frequency, indexed like the vocabulary
    idf: Vec<f64>,

    /// Is fitted (vocabulary built)
    is_fitted: bool,
}

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the vocabulary and IDF weights on tokenized documents
    pub fn fit(&mut self, documents: &[Vec<String>]) -> Result<()> {
        let mut term_doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in documents {
            let unique_terms: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique_terms {
                *term_doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        // Filter vocabulary by document frequency
        let min_df = self.config.min_doc_freq.max(1);
        let mut vocab_list: Vec<(&str, usize)> = term_doc_freq
            .into_iter()
            .filter(|(_, freq)| *freq >= min_df)
            .collect();

        // Most frequent first, then alphabetical, then limit vocabulary size
        vocab_list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        vocab_list.truncate(self.config.max_vocab_size);

        if vocab_list.is_empty() {
            return Err(AppError::Model(
                "Vocabulary is empty; no usable tokens in training messages".to_string(),
            ));
        }

        // Column order is alphabetical
        vocab_list.sort_by(|a, b| a.0.cmp(b.0));

        // Smooth IDF: ln((1 + n) / (1 + df)) + 1
        let n_docs = documents.len() as f64;
        self.idf = vocab_list
            .iter()
            .map(|(_, df)| ((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        self.vocabulary = vocab_list
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _))| (term.to_string(), idx))
            .collect();

        self.is_fitted = true;

        Ok(())
    }

    /// Transform one tokenized document into an L2-normalized TF-IDF row.
    /// Unknown tokens are ignored.
    pub fn transform(&self, tokens: &[String]) -> Result<SparseRow> {
        if !self.is_fitted {
            return Err(AppError::Model(
                "FeatureExtractor must be fitted before transform".to_string(),
            ));
        }

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        row.sort_by_key(|(idx, _)| *idx);

        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in row.iter_mut() {
                *value /= norm;
            }
        }

        Ok(row)
    }

    /// Transform many documents
    pub fn transform_all(&self, documents: &[Vec<String>]) -> Result<FeatureMatrix> {
        let rows = documents
            .iter()
            .map(|doc| self.transform(doc))
            .collect::<Result<Vec<_>>>()?;
        Ok(FeatureMatrix::new(self.n_features(), rows))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, documents: &[Vec<String>]) -> Result<FeatureMatrix> {
        self.fit(documents)?;
        self.transform_all(documents)
    }

    /// Get number of features
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Check if fitted
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Get vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Column index of a term
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }
}

/// Sparse TF-IDF rows with a fixed width
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_features: usize,
    rows: Vec<SparseRow>,
}

impl FeatureMatrix {
    pub fn new(n_features: usize, rows: Vec<SparseRow>) -> Self {
        Self { n_features, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn row(&self, idx: usize) -> &SparseRow {
        &self.rows[idx]
    }

    /// Dense row-major matrix of the selected rows
    pub fn to_dense(&self, indices: &[usize]) -> DenseMatrix<f64> {
        let mut data = vec![0.0; indices.len() * self.n_features];
        for (out_row, &idx) in indices.iter().enumerate() {
            let offset = out_row * self.n_features;
            for &(col, value) in &self.rows[idx] {
                data[offset + col] = value;
            }
        }
        DenseMatrix::new(indices.len(), self.n_features, data, false)
    }

    /// Dense matrix of every row
    pub fn to_dense_all(&self) -> DenseMatrix<f64> {
        let all: Vec<usize> = (0..self.rows.len()).collect();
        self.to_dense(&all)
    }
}
