//! Rows written to (and, for history, read from) the record store.

use chrono::{DateTime, Utc};
use floatpoint_common::{BgcInput, BgcPrediction, Region, RequestKind, SpatialTemporalQuery};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const TABLE_PREDICTIONS: &str = "predictions";
pub const TABLE_QUERIES: &str = "queries";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNames {
    pub predictions: String,
    pub queries: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            predictions: TABLE_PREDICTIONS.to_string(),
            queries: TABLE_QUERIES.to_string(),
        }
    }
}

/// One BGC request: six inputs, six predictions (absent on failure) and the region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub temperature: f64,
    pub salinity: f64,
    pub pressure: f64,
    pub dissolved_oxygen: Option<f64>,
    pub nitrate: Option<f64>,
    pub chlorophyll: Option<f64>,
    pub predicted_temperature: Option<f64>,
    pub predicted_salinity: Option<f64>,
    pub predicted_pressure: Option<f64>,
    pub predicted_dissolved_oxygen: Option<f64>,
    pub predicted_nitrate: Option<f64>,
    pub predicted_chlorophyll: Option<f64>,
    pub region: Region,
    pub success: bool,
    pub error: Option<String>,
}

impl PredictionRow {
    pub fn new(input: &BgcInput, outcome: Result<&BgcPrediction, &str>) -> Self {
        let region = Region::classify(input.temperature, input.salinity, input.pressure);
        let p = outcome.ok();
        Self {
            temperature: input.temperature,
            salinity: input.salinity,
            pressure: input.pressure,
            dissolved_oxygen: input.dissolved_oxygen,
            nitrate: input.nitrate,
            chlorophyll: input.chlorophyll,
            predicted_temperature: p.map(|p| p.temperature),
            predicted_salinity: p.map(|p| p.salinity),
            predicted_pressure: p.map(|p| p.pressure),
            predicted_dissolved_oxygen: p.map(|p| p.dissolved_oxygen),
            predicted_nitrate: p.map(|p| p.nitrate),
            predicted_chlorophyll: p.map(|p| p.chlorophyll),
            region,
            success: outcome.is_ok(),
            error: outcome.err().map(str::to_string),
        }
    }
}

/// One NLP or spatial-temporal request, in the query-history layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    pub query_text: String,
    pub params: Value,
}

impl QueryRow {
    pub fn nlp(text: &str, outcome: Result<&str, &str>, timestamp: DateTime<Utc>) -> Self {
        let mut params = json!({
            "type": RequestKind::Nlp,
            "timestamp": timestamp,
            "success": outcome.is_ok(),
        });
        match outcome {
            Ok(response) => params["response"] = json!(response),
            Err(error) => params["error"] = json!(error),
        }
        Self { query_text: text.to_string(), params }
    }

    pub fn spatial_temporal(
        query: &SpatialTemporalQuery,
        outcome: Result<&Value, &str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let datetime = query.datetime.as_deref().unwrap_or_default();
        let mut params = json!({
            "type": RequestKind::SpatialTemporal,
            "latitude": query.latitude,
            "longitude": query.longitude,
            "datetime": datetime,
            "timestamp": timestamp,
            "success": outcome.is_ok(),
        });
        match outcome {
            Ok(prediction) => params["prediction"] = prediction.clone(),
            Err(error) => params["error"] = json!(error),
        }
        Self {
            query_text: format!("{}, {} @ {}", query.latitude, query.longitude, datetime),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceRecord {
    Prediction(PredictionRow),
    Query(QueryRow),
}

impl PersistenceRecord {
    pub fn table<'a>(&self, tables: &'a TableNames) -> &'a str {
        match self {
            PersistenceRecord::Prediction(_) => &tables.predictions,
            PersistenceRecord::Query(_) => &tables.queries,
        }
    }

    /// Serialise with the owning user and creation time stamped in.
    pub fn to_row(&self, user_id: &str, created_at: DateTime<Utc>) -> Result<Value, serde_json::Error> {
        let mut row = match self {
            PersistenceRecord::Prediction(r) => serde_json::to_value(r)?,
            PersistenceRecord::Query(r) => serde_json::to_value(r)?,
        };
        row["user_id"] = json!(user_id);
        row["created_at"] = json!(created_at);
        Ok(row)
    }
}

/// A `queries` row as read back for the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuery {
    pub id: Value,
    pub user_id: String,
    pub query_text: String,
    #[serde(default)]
    pub params: Value,
    pub created_at: String,
}
