//! Disaster response message pipeline.
//!
//! Three stages share one SQLite table:
//! - `etl`: join the messages and categories CSVs and persist the cleaned table
//! - `ml`: train and evaluate a multi-label TF-IDF + random forest classifier
//! - `api`: serve the overview dashboard and classify new messages

pub mod api;
pub mod args;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod etl;
pub mod ml;
pub mod models;
pub mod storage;
pub mod telemetry;

pub use error::{AppError, Result};
