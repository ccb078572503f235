//! Inference backend trait and error type.
//!
//! The model itself runs elsewhere. A backend owns the wire contract for the
//! three remote operations:
//!   process_nl_query          — free text in, answer text out
//!   predict_bgc               — six readings in, labelled-value mapping out
//!   predict_spatial_temporal  — (lat, lon, datetime) in, opaque value out

use async_trait::async_trait;
use floatpoint_common::BgcInput;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Inference timed out after {0:?}")]
    Timeout(Duration),
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },
    #[error("Model returned an error: {0}")]
    Remote(String),
    #[error("Unexpected reply shape: {0}")]
    UnexpectedShape(String),
}

// ── Replies ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlReply {
    pub text: String,
}

/// Decorated label → value, e.g. `"🌡️ Temperature" → "26.1 °C"`.
pub type LabelledValues = Map<String, Value>;

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn process_nl_query(&self, text: &str) -> Result<NlReply, InferenceError>;
    async fn predict_bgc(&self, input: &BgcInput) -> Result<LabelledValues, InferenceError>;
    async fn predict_spatial_temporal(
        &self,
        latitude: f64,
        longitude: f64,
        datetime: &str,
    ) -> Result<Value, InferenceError>;
    fn name(&self) -> &str;
}
