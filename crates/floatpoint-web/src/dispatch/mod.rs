//! Request router: classify a payload, run the matching prediction, wrap the
//! result in the response envelope and hand a record to the persistence writer.
//!
//! One request is one async chain. Identity resolution and inference do not
//! depend on each other and run side by side, each with its own time limit.
//! The write is handed to a background task once the envelope is built; the
//! response never waits for it.

mod bgc;
mod nlp;
mod spatial;

use axum::http::StatusCode;
use chrono::{DateTime, SecondsFormat, Utc};
use floatpoint_common::{PredictionEnvelope, PredictionRequest, PredictionResult, ValidationError};
use floatpoint_inference::{InferenceBackend, InferenceError};
use floatpoint_store::{IdentityResolver, PersistenceRecord, PersistenceWriter, WriteOutcome};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn, Span};
use uuid::Uuid;

/// The only failures that reach a client.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl PredictError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictError::Validation(_) => StatusCode::BAD_REQUEST,
            PredictError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PredictOptions {
    /// Upper bound on one remote inference call.
    pub timeout: Duration,
    pub strip_summary_suffix: bool,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(60), strip_summary_suffix: true }
    }
}

#[derive(Debug)]
pub struct PredictOutcome {
    pub status: StatusCode,
    pub envelope: PredictionEnvelope,
    /// Background write for an identified caller. `None` when nothing is written.
    pub persisted: Option<JoinHandle<WriteOutcome>>,
}

pub struct Predictor {
    backend: Arc<dyn InferenceBackend>,
    identity: IdentityResolver,
    writer: PersistenceWriter,
    options: PredictOptions,
}

impl Predictor {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        identity: IdentityResolver,
        writer: PersistenceWriter,
        options: PredictOptions,
    ) -> Self {
        Self { backend, identity, writer, options }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Handle one prediction payload. `authorization` is the raw header value, if any.
    #[instrument(skip_all, fields(request_id = %Uuid::new_v4(), kind = tracing::field::Empty))]
    pub async fn handle(&self, payload: &Value, authorization: Option<&str>) -> PredictOutcome {
        let timestamp = Utc::now();

        let request = match PredictionRequest::classify(payload) {
            Ok(request) => stamp_datetime(request, timestamp),
            Err(e) => return self.rejected(e, timestamp),
        };
        let kind = request.kind();
        Span::current().record("kind", kind.as_str());

        let (identity, (result, record)) = tokio::join!(
            self.identity.resolve(authorization),
            self.run(&request, timestamp),
        );

        let (status, envelope) = match result {
            Ok(result) => {
                info!(backend = self.backend.name(), "Prediction served");
                (StatusCode::OK, PredictionEnvelope::success(&request, &result, timestamp))
            }
            Err(e) => {
                let e = PredictError::from(e);
                error!("Inference failed: {e}");
                (e.status_code(), PredictionEnvelope::failure(Some(kind), Some(&request), e.to_string(), timestamp))
            }
        };

        let persisted = self.writer.spawn(identity, record);
        PredictOutcome { status, envelope, persisted }
    }

    /// Validation failures are answered immediately: no identity lookup, no inference, no write.
    fn rejected(&self, e: ValidationError, timestamp: DateTime<Utc>) -> PredictOutcome {
        warn!("Rejected request: {e}");
        let kind = e.kind();
        let e = PredictError::from(e);
        PredictOutcome {
            status: e.status_code(),
            envelope: PredictionEnvelope::failure(kind, None, e.to_string(), timestamp),
            persisted: None,
        }
    }

    /// Run the prediction for an already classified request and build the
    /// record describing it, whichever way it went.
    async fn run(
        &self,
        request: &PredictionRequest,
        timestamp: DateTime<Utc>,
    ) -> (Result<PredictionResult, InferenceError>, PersistenceRecord) {
        let backend = self.backend.as_ref();
        match request {
            PredictionRequest::NlQuery { text } => {
                let answer = self
                    .bounded(nlp::predict(backend, text, self.options.strip_summary_suffix))
                    .await;
                let record = nlp::record(text, answer.as_ref(), timestamp);
                (answer.map(|text| PredictionResult::NlAnswer { text }), record)
            }
            PredictionRequest::Bgc(input) => {
                let prediction = self.bounded(bgc::predict(backend, input)).await;
                let record = bgc::record(input, prediction.as_ref());
                (prediction.map(|prediction| bgc::result(input, prediction)), record)
            }
            PredictionRequest::SpatialTemporal(query) => {
                let raw = self.bounded(spatial::predict(backend, query, timestamp)).await;
                let record = spatial::record(query, raw.as_ref(), timestamp);
                (raw.map(|raw| PredictionResult::SpatialTemporal { raw }), record)
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, InferenceError>>,
    ) -> Result<T, InferenceError> {
        match tokio::time::timeout(self.options.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::Timeout(self.options.timeout)),
        }
    }
}

/// Spatial-temporal requests without a datetime are asked about "now",
/// meaning the instant the request is handled.
fn stamp_datetime(request: PredictionRequest, timestamp: DateTime<Utc>) -> PredictionRequest {
    match request {
        PredictionRequest::SpatialTemporal(mut q) if q.datetime.is_none() => {
            q.datetime = Some(iso_instant(timestamp));
            PredictionRequest::SpatialTemporal(q)
        }
        other => other,
    }
}

pub(crate) fn iso_instant(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
