//! Spatial-temporal path. The model's reply is opaque and returned as-is.

use chrono::{DateTime, Utc};
use floatpoint_common::SpatialTemporalQuery;
use floatpoint_inference::{InferenceBackend, InferenceError};
use floatpoint_store::{PersistenceRecord, QueryRow};
use serde_json::Value;

use super::iso_instant;

pub(super) async fn predict(
    backend: &dyn InferenceBackend,
    query: &SpatialTemporalQuery,
    timestamp: DateTime<Utc>,
) -> Result<Value, InferenceError> {
    let datetime = query.datetime.clone().unwrap_or_else(|| iso_instant(timestamp));
    backend.predict_spatial_temporal(query.latitude, query.longitude, &datetime).await
}

pub(super) fn record(
    query: &SpatialTemporalQuery,
    raw: Result<&Value, &InferenceError>,
    timestamp: DateTime<Utc>,
) -> PersistenceRecord {
    let row = match raw {
        Ok(raw) => QueryRow::spatial_temporal(query, Ok(raw), timestamp),
        Err(e) => QueryRow::spatial_temporal(query, Err(&e.to_string()), timestamp),
    };
    PersistenceRecord::Query(row)
}
