//! Axum router — maps all URL paths to handlers.

use axum::{
    Router,
    routing::get,
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    health::healthz,
    predict::{describe, predict},
    queries::{delete_query, list_queries},
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/healthz",      get(healthz))
        .route("/api/predict",  get(describe).post(predict))
        .route("/api/queries",  get(list_queries).delete(delete_query))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
