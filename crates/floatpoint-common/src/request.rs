//! Inbound prediction requests and their classification.
//!
//! A request body is an untyped JSON object. Its shape is decided by which
//! fields are present, checked in a fixed order:
//!   1. non-empty string `query`             → natural-language query
//!   2. both `latitude` and `longitude`      → spatial-temporal query
//!   3. anything else                        → BGC sensor readings
//!
//! The first match wins. Missing mandatory BGC fields fail validation here,
//! before anything touches the network.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

pub const BGC_REQUIRED_FIELDS: [&str; 3] = ["temperature", "salinity", "pressure"];
pub const BGC_OPTIONAL_FIELDS: [&str; 3] = ["dissolvedOxygen", "nitrate", "chlorophyll"];

/// Which prediction path a request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Nlp,
    Bgc,
    SpatialTemporal,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Nlp => "nlp",
            RequestKind::Bgc => "bgc",
            RequestKind::SpatialTemporal => "spatial_temporal",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Biogeochemical sensor readings. The first three are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgcInput {
    pub temperature: f64,
    pub salinity: f64,
    pub pressure: f64,
    pub dissolved_oxygen: Option<f64>,
    pub nitrate: Option<f64>,
    pub chlorophyll: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialTemporalQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// ISO-8601. Filled with the current instant at dispatch time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionRequest {
    NlQuery { text: String },
    Bgc(BgcInput),
    SpatialTemporal(SpatialTemporalQuery),
}

impl PredictionRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            PredictionRequest::NlQuery { .. } => RequestKind::Nlp,
            PredictionRequest::Bgc(_) => RequestKind::Bgc,
            PredictionRequest::SpatialTemporal(_) => RequestKind::SpatialTemporal,
        }
    }

    /// Classify an untyped payload into exactly one request shape.
    pub fn classify(payload: &Value) -> Result<Self, ValidationError> {
        let obj = payload.as_object().ok_or(ValidationError::NotAnObject)?;

        if let Some(Value::String(text)) = obj.get("query") {
            if !text.is_empty() {
                return Ok(PredictionRequest::NlQuery { text: text.clone() });
            }
        }

        if is_present(obj, "latitude") && is_present(obj, "longitude") {
            return classify_spatial(obj).map(PredictionRequest::SpatialTemporal);
        }

        classify_bgc(obj).map(PredictionRequest::Bgc)
    }
}

fn is_present(obj: &Map<String, Value>, field: &str) -> bool {
    !matches!(obj.get(field), None | Some(Value::Null))
}

fn number_field(
    obj: &Map<String, Value>,
    field: &'static str,
    kind: RequestKind,
) -> Result<Option<f64>, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or(ValidationError::InvalidField { kind, field, expected: "a finite number" }),
        Some(_) => Err(ValidationError::InvalidField { kind, field, expected: "a number" }),
    }
}

fn classify_spatial(obj: &Map<String, Value>) -> Result<SpatialTemporalQuery, ValidationError> {
    let kind = RequestKind::SpatialTemporal;
    let invalid = |field| ValidationError::InvalidField { kind, field, expected: "a number" };

    let latitude = number_field(obj, "latitude", kind)?.ok_or_else(|| invalid("latitude"))?;
    let longitude = number_field(obj, "longitude", kind)?.ok_or_else(|| invalid("longitude"))?;

    let datetime = match obj.get("datetime") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) if is_iso8601(s) => Some(s.clone()),
        Some(_) => {
            return Err(ValidationError::InvalidField {
                kind,
                field: "datetime",
                expected: "an ISO-8601 date or datetime",
            })
        }
    };

    Ok(SpatialTemporalQuery { latitude, longitude, datetime })
}

fn classify_bgc(obj: &Map<String, Value>) -> Result<BgcInput, ValidationError> {
    let kind = RequestKind::Bgc;

    let any_bgc_field = BGC_REQUIRED_FIELDS
        .iter()
        .chain(BGC_OPTIONAL_FIELDS.iter())
        .any(|f| is_present(obj, f));
    if !any_bgc_field {
        return Err(ValidationError::UnknownShape);
    }

    let temperature = number_field(obj, "temperature", kind)?;
    let salinity = number_field(obj, "salinity", kind)?;
    let pressure = number_field(obj, "pressure", kind)?;

    let (temperature, salinity, pressure) = match (temperature, salinity, pressure) {
        (Some(t), Some(s), Some(p)) => (t, s, p),
        (t, s, p) => {
            let missing = BGC_REQUIRED_FIELDS
                .iter()
                .zip([t, s, p])
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| *name)
                .collect();
            return Err(ValidationError::MissingFields(missing));
        }
    };

    Ok(BgcInput {
        temperature,
        salinity,
        pressure,
        dissolved_oxygen: number_field(obj, "dissolvedOxygen", kind)?,
        nitrate: number_field(obj, "nitrate", kind)?,
        chlorophyll: number_field(obj, "chlorophyll", kind)?,
    })
}

fn is_iso8601(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
