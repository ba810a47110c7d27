use crate::api::AppState;
use crate::error::{AppError, Result};
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        categories: state.dataset.schema.len(),
        messages: state.dataset.len(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub categories: usize,
    pub messages: usize,
}

/// Index page with the overview charts
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    Ok(Html(state.templates.render_index(&state.dashboard)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassifyQuery {
    #[serde(default)]
    pub query: String,
}

/// Classify a message and render the result page
pub async fn go(
    State(state): State<AppState>,
    Query(params): Query<ClassifyQuery>,
) -> Result<Html<String>> {
    let labeled = classify_query(&state, params.query.clone()).await?;
    Ok(Html(state.templates.render_go(&params.query, &labeled)?))
}

/// Classify a message, JSON response
pub async fn classify(
    State(state): State<AppState>,
    Query(params): Query<ClassifyQuery>,
) -> Result<Json<ClassifyResponse>> {
    let labeled = classify_query(&state, params.query.clone()).await?;

    let matched = labeled
        .iter()
        .filter(|(_, flag)| *flag == 1)
        .map(|(name, _)| name.clone())
        .collect();

    Ok(Json(ClassifyResponse {
        query: params.query,
        classification: labeled.into_iter().collect(),
        matched,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub query: String,
    pub classification: BTreeMap<String, u8>,
    /// Categories predicted as present, in schema order
    pub matched: Vec<String>,
}

/// Run inference on the blocking pool
async fn classify_query(state: &AppState, query: String) -> Result<Vec<(String, u8)>> {
    let model = state.model.clone();
    let labeled = tokio::task::spawn_blocking(move || model.predict_labeled(&query))
        .await
        .map_err(|e| AppError::Internal(format!("Classification task failed: {}", e)))??;

    debug!(
        positive = labeled.iter().filter(|(_, flag)| *flag == 1).count(),
        "Query classified"
    );
    Ok(labeled)
}
