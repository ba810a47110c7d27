//! Overview charts rendered on the index page.
//!
//! Everything here is computed once from the loaded table and kept in the
//! application state.

pub mod stats;

pub use stats::{category_counts, genre_counts, top_words};

use crate::models::Dataset;
use serde::Serialize;

/// Number of words shown in the frequent words chart
pub const TOP_WORDS: usize = 10;

/// One Plotly bar trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: Vec<String>,
    pub y: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub yaxis: AxisTitle,
    pub xaxis: AxisTitle,
}

/// A Plotly figure, serialized straight into the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub data: Vec<BarTrace>,
    pub layout: ChartLayout,
}

impl Chart {
    pub fn bar(title: &str, x_title: &str, points: Vec<(String, u64)>) -> Self {
        let (x, y) = points.into_iter().unzip();
        Self {
            data: vec![BarTrace { kind: "bar", x, y }],
            layout: ChartLayout {
                title: title.to_string(),
                yaxis: AxisTitle {
                    title: "Count".to_string(),
                },
                xaxis: AxisTitle {
                    title: x_title.to_string(),
                },
            },
        }
    }
}

/// Precomputed charts for the index page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub graphs: Vec<Chart>,
    pub ids: Vec<String>,
}

impl Dashboard {
    pub fn build(dataset: &Dataset) -> Self {
        let graphs = vec![
            Chart::bar(
                "Distribution of Message Genres",
                "Genre",
                genre_counts(dataset),
            ),
            Chart::bar(
                "Distribution of Message Categories",
                "Category",
                category_counts(dataset),
            ),
            Chart::bar("Frequent Words", "Words", top_words(dataset, TOP_WORDS)),
        ];
        let ids = (0..graphs.len()).map(|i| format!("graph-{}", i)).collect();

        Self { graphs, ids }
    }
}
