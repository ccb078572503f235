//! Normalized prediction output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::region::Region;
use crate::request::RequestKind;

/// Six predicted BGC parameters. Every field is populated; values the model
/// reply did not carry (or carried unparsable) are 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgcPrediction {
    pub temperature: f64,
    pub salinity: f64,
    pub pressure: f64,
    pub dissolved_oxygen: f64,
    pub nitrate: f64,
    pub chlorophyll: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionResult {
    NlAnswer { text: String },
    Bgc { prediction: BgcPrediction, region: Region },
    /// Passed through verbatim, never inspected.
    SpatialTemporal { raw: Value },
}

impl PredictionResult {
    pub fn kind(&self) -> RequestKind {
        match self {
            PredictionResult::NlAnswer { .. } => RequestKind::Nlp,
            PredictionResult::Bgc { .. } => RequestKind::Bgc,
            PredictionResult::SpatialTemporal { .. } => RequestKind::SpatialTemporal,
        }
    }
}
