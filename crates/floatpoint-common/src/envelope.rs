//! Uniform response envelope returned for every prediction request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::region::Region;
use crate::request::{PredictionRequest, RequestKind};
use crate::result::PredictionResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEnvelope {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    /// Absent only when the payload shape could not be determined.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RequestKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionEnvelope {
    fn empty(success: bool, kind: Option<RequestKind>, timestamp: DateTime<Utc>) -> Self {
        Self {
            success,
            timestamp,
            kind,
            query: None,
            input: None,
            response: None,
            prediction: None,
            region: None,
            error: None,
        }
    }

    /// Successful reply: the input is echoed next to the result.
    pub fn success(
        request: &PredictionRequest,
        result: &PredictionResult,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut env = Self::empty(true, Some(result.kind()), timestamp);
        env.echo(request);
        match result {
            PredictionResult::NlAnswer { text } => env.response = Some(text.clone()),
            PredictionResult::Bgc { prediction, region } => {
                env.prediction = serde_json::to_value(prediction).ok();
                env.region = Some(*region);
            }
            PredictionResult::SpatialTemporal { raw } => env.prediction = Some(raw.clone()),
        }
        env
    }

    /// Failed reply. `request` is echoed back when the payload got far enough to be parsed.
    pub fn failure(
        kind: Option<RequestKind>,
        request: Option<&PredictionRequest>,
        error: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut env = Self::empty(false, kind, timestamp);
        if let Some(req) = request {
            env.echo(req);
        }
        env.error = Some(error.into());
        env
    }

    fn echo(&mut self, request: &PredictionRequest) {
        match request {
            PredictionRequest::NlQuery { text } => self.query = Some(text.clone()),
            PredictionRequest::Bgc(input) => self.input = serde_json::to_value(input).ok(),
            PredictionRequest::SpatialTemporal(q) => self.input = serde_json::to_value(q).ok(),
        }
    }
}
