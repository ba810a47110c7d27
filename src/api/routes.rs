use crate::api::{handlers, AppState};
use axum::{routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the web router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/index", get(handlers::index))
        .route("/go", get(handlers::go))
        // JSON
        .route("/health", get(handlers::health_check))
        .route("/api/classify", get(handlers::classify))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
