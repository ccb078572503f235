//! Prediction endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use floatpoint_common::{PredictionEnvelope, ValidationError};
use serde_json::{json, Value};
use tracing::warn;

use crate::handlers::authorization;
use crate::state::SharedState;

/// POST /api/predict - Classify the body and run the matching prediction
pub async fn predict(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            let e = ValidationError::MalformedBody(rejection.body_text());
            warn!("Rejected request: {e}");
            let envelope = PredictionEnvelope::failure(None, None, e.to_string(), Utc::now());
            return (StatusCode::BAD_REQUEST, Json(envelope)).into_response();
        }
    };

    let outcome = state.predictor.handle(&payload, authorization(&headers)).await;
    (outcome.status, Json(outcome.envelope)).into_response()
}

/// GET /api/predict - Describe the endpoint
pub async fn describe(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "message": "FloatPoint Oceanographic Prediction API",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.predictor.backend_name(),
        "endpoints": {
            "POST": "/api/predict - Natural language, BGC or spatial-temporal prediction",
            "GET": "/api/queries - Query history for the authenticated caller",
            "DELETE": "/api/queries?id=<id> - Delete one history entry",
        },
        "usage": {
            "nlp": { "required": ["query"], "example": "What's the temperature at 15°N 75°E tomorrow?" },
            "bgc": {
                "required": ["temperature", "salinity", "pressure"],
                "optional": ["dissolvedOxygen", "nitrate", "chlorophyll"],
            },
            "spatial_temporal": { "required": ["latitude", "longitude"], "optional": ["datetime"] },
        },
    }))
}
