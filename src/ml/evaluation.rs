//! Per-category precision / recall / F1 reports.

use crate::error::{AppError, Result};
use crate::ml::search::subset_accuracy;
use crate::models::CategorySchema;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for one class of one category
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Report for a single category, classes 0 and 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: String,
    /// Classes present in truth or prediction, ascending
    pub classes: Vec<(u8, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// Reports for every category plus whole-vector accuracy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub categories: Vec<CategoryReport>,
    pub subset_accuracy: f64,
    pub n_samples: usize,
}

impl EvaluationReport {
    /// Mean of the per-category weighted F1 scores
    pub fn mean_weighted_f1(&self) -> f64 {
        if self.categories.is_empty() {
            return 0.0;
        }
        self.categories
            .iter()
            .map(|c| c.weighted_avg.f1_score)
            .sum::<f64>()
            / self.categories.len() as f64
    }

    pub fn category(&self, name: &str) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.category == name)
    }
}

/// Evaluate predictions column by column, driven by the schema.
pub fn evaluate(
    y_true: &Array2<u8>,
    y_pred: &Array2<u8>,
    schema: &CategorySchema,
) -> Result<EvaluationReport> {
    if y_true.dim() != y_pred.dim() {
        return Err(AppError::Model(format!(
            "Prediction shape {:?} does not match label shape {:?}",
            y_pred.dim(),
            y_true.dim()
        )));
    }
    if y_true.ncols() != schema.len() {
        return Err(AppError::Validation(format!(
            "Label matrix has {} columns, schema has {} categories",
            y_true.ncols(),
            schema.len()
        )));
    }

    let categories = schema
        .iter()
        .enumerate()
        .map(|(idx, name)| category_report(name, y_true.column(idx), y_pred.column(idx)))
        .collect();

    Ok(EvaluationReport {
        categories,
        subset_accuracy: subset_accuracy(y_true, y_pred),
        n_samples: y_true.nrows(),
    })
}

fn category_report(name: &str, y_true: ArrayView1<'_, u8>, y_pred: ArrayView1<'_, u8>) -> CategoryReport {
    let n = y_true.len();
    let mut classes = Vec::new();

    for class in [0u8, 1u8] {
        let present = y_true.iter().chain(y_pred.iter()).any(|&v| v == class);
        if !present {
            continue;
        }

        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_count = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t == class, p == class) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_count += 1,
                (false, false) => {}
            }
        }

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };

        let recall = if tp + fn_count > 0 {
            tp as f64 / (tp + fn_count) as f64
        } else {
            0.0
        };

        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        classes.push((
            class,
            ClassMetrics {
                precision,
                recall,
                f1_score,
                support: tp + fn_count,
            },
        ));
    }

    let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    let accuracy = if n > 0 { correct as f64 / n as f64 } else { 0.0 };

    let k = classes.len().max(1) as f64;
    let macro_avg = ClassMetrics {
        precision: classes.iter().map(|(_, m)| m.precision).sum::<f64>() / k,
        recall: classes.iter().map(|(_, m)| m.recall).sum::<f64>() / k,
        f1_score: classes.iter().map(|(_, m)| m.f1_score).sum::<f64>() / k,
        support: n,
    };

    let total = n.max(1) as f64;
    let weighted = |f: fn(&ClassMetrics) -> f64| {
        classes
            .iter()
            .map(|(_, m)| f(m) * m.support as f64)
            .sum::<f64>()
            / total
    };
    let weighted_avg = ClassMetrics {
        precision: weighted(|m| m.precision),
        recall: weighted(|m| m.recall),
        f1_score: weighted(|m| m.f1_score),
        support: n,
    };

    CategoryReport {
        category: name.to_string(),
        classes,
        accuracy,
        macro_avg,
        weighted_avg,
    }
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.category)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (class, m) in &self.classes {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                class, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (label, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                label, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.categories {
            writeln!(f, "{}", report)?;
        }
        writeln!(
            f,
            "subset accuracy: {:.4} over {} samples",
            self.subset_accuracy, self.n_samples
        )
    }
}
